use easydialogs::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
struct Article {
    #[field(label = "Title")]
    title: String,
}

fn main() {}
