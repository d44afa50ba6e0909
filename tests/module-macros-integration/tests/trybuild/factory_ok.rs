use di_abstractions::{FactoryError, ModuleFactory};
use module_macros::module_factory;
use std::sync::Arc;

#[module_factory]
pub async fn greeter(prefix: Arc<String>, target: String) -> Result<String, FactoryError> {
    Ok(format!("{}, {}", prefix, target))
}

#[module_factory(name = "unit")]
fn nothing() {}

fn main() {
    let factory: Arc<dyn ModuleFactory> = Arc::new(GreeterFactory);
    assert_eq!(factory.params(), vec!["prefix", "target"]);
    assert_eq!(NothingFactory.name(), Some("unit"));
}
