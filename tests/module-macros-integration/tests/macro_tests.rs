//! `#[module_factory]` 集成测试

use di_abstractions::{Container, FactoryError, Instance, ModuleFactory, Registration};
use di_impl::FountContainer;
use module_macros::module_factory;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
}

#[derive(Debug)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[module_factory(name = "http_server")]
pub async fn server(host: Arc<String>, settings: Settings) -> Result<Server, FactoryError> {
    if settings.port == 0 {
        return Err(FactoryError::failed("port must not be zero"));
    }
    Ok(Server {
        address: format!("{}:{}", host, settings.port),
        port: settings.port,
    })
}

#[module_factory]
fn clock() -> u64 {
    1_700_000_000
}

#[module_factory]
fn passthrough(r#type: Instance) -> Result<Instance, FactoryError> {
    Ok(r#type)
}

#[test]
fn test_generated_metadata() {
    assert_eq!(ServerFactory.name(), Some("http_server"));
    assert_eq!(ServerFactory.params(), vec!["host", "settings"]);

    assert_eq!(ClockFactory.name(), Some("clock"));
    assert!(ClockFactory.params().is_empty());

    assert_eq!(PassthroughFactory.params(), vec!["type"]);
}

#[tokio::test]
async fn test_create_converts_arguments() {
    let instance = ServerFactory
        .create(vec![
            Arc::new("localhost".to_string()) as Instance,
            Arc::new(Settings { port: 8080 }) as Instance,
        ])
        .await
        .unwrap();

    let server = instance.downcast::<Server>().unwrap();
    assert_eq!(server.address, "localhost:8080");
    assert_eq!(server.port, 8080);
}

#[tokio::test]
async fn test_create_reports_argument_errors() {
    let missing = ServerFactory
        .create(vec![Arc::new("localhost".to_string()) as Instance])
        .await
        .unwrap_err();
    assert!(matches!(missing, FactoryError::MissingArgument { ref param } if param == "settings"));

    let mismatch = ServerFactory
        .create(vec![
            Arc::new(42_u8) as Instance,
            Arc::new(Settings { port: 8080 }) as Instance,
        ])
        .await
        .unwrap_err();
    assert!(matches!(mismatch, FactoryError::ArgumentTypeMismatch { ref param, .. } if param == "host"));
}

#[tokio::test]
async fn test_create_propagates_function_errors() {
    let error = ServerFactory
        .create(vec![
            Arc::new("localhost".to_string()) as Instance,
            Arc::new(Settings { port: 0 }) as Instance,
        ])
        .await
        .unwrap_err();

    assert!(matches!(error, FactoryError::Failed { .. }));
}

#[tokio::test]
async fn test_sync_and_instance_factories() {
    let clock = ClockFactory.create(Vec::new()).await.unwrap();
    assert_eq!(*clock.downcast::<u64>().unwrap(), 1_700_000_000);

    let original: Instance = Arc::new("same".to_string());
    let passed = PassthroughFactory.create(vec![original.clone()]).await.unwrap();
    assert!(Arc::ptr_eq(&original, &passed));
}

#[tokio::test]
async fn test_container_injects_generated_factory() {
    let container = FountContainer::new();
    container.register("host", Registration::instance(Arc::new("0.0.0.0".to_string())));
    container.register("settings", Registration::instance(Arc::new(Settings { port: 80 })));

    let instance = container
        .inject(
            &["host".to_string(), "settings".to_string()],
            Arc::new(ServerFactory),
        )
        .await
        .unwrap();

    assert_eq!(instance.downcast::<Server>().unwrap().address, "0.0.0.0:80");
}
