use module_macros::module_factory;

#[module_factory]
fn describe(&self) -> String {
    String::new()
}

fn main() {}
