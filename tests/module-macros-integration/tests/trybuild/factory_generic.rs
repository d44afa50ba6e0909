use module_macros::module_factory;

#[module_factory]
fn identity<T>(value: T) -> T {
    value
}

fn main() {}
