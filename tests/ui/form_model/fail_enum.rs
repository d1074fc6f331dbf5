use easydialogs::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
enum Choice {
    A,
    B,
}

fn main() {}
