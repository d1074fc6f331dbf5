use easydialogs::form::FormModel;

#[derive(FormModel)]
#[allow(dead_code)]
struct Pair(String, u32);

fn main() {}
