use easydialogs::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
struct Wrapper<T> {
    value: T,
}

fn main() {}
