use easydialogs::form::{FieldLens, FormModel};

#[derive(Clone, Default, easydialogs::form::FormModel)]
struct Account {
    #[field(name = "Full name")]
    full_name: String,
    age: Option<u32>,
    #[field(skip)]
    #[allow(dead_code)]
    cached: Vec<u8>,
}

fn main() {
    let fields = Account::fields();
    assert_eq!(fields.full_name().key().as_str(), "full_name");
    assert_eq!(fields.full_name().display_name(), "Full name");

    let mut account = Account::default();
    fields.age().set(&mut account, Some(42));
    assert_eq!(fields.age().get(&account), &Some(42));
}
