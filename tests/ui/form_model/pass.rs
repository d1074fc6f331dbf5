use easydialogs::form::{FieldLens, FormModel};

#[derive(Clone, Default, easydialogs::form::FormModel)]
struct Contact {
    email: String,
}

fn main() {
    let fields = Contact::fields();
    let lens = fields.email();
    let mut model = Contact {
        email: "a@example.com".to_string(),
    };
    lens.set(&mut model, "b@example.com".to_string());
    assert_eq!(lens.key().as_str(), "email");
    assert_eq!(lens.display_name(), "email");
    assert_eq!(lens.get(&model), "b@example.com");
}
