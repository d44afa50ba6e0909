//! 模块加载端到端测试

use di_abstractions::{ExportCatalog, FactoryError, ModuleExport};
use di_impl::FountContainer;
use module_loader::{LoaderConfig, LoaderError, ModuleLoader};
use module_macros::module_factory;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Debug)]
pub struct Repository {
    pub url: String,
}

#[derive(Debug)]
pub struct Service {
    pub repository: Arc<Repository>,
    pub retries: i64,
}

#[module_factory]
async fn repository(database: Arc<Value>) -> Result<Repository, FactoryError> {
    let url = database["url"]
        .as_str()
        .ok_or_else(|| FactoryError::failed("database.url missing"))?;
    Ok(Repository {
        url: url.to_string(),
    })
}

#[module_factory]
async fn service(repository: Arc<Repository>, retries: Arc<Value>) -> Service {
    Service {
        repository,
        retries: retries.as_i64().unwrap_or_default(),
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn catalog() -> Arc<ExportCatalog> {
    let catalog = ExportCatalog::new();
    catalog
        .add_factory("repository", RepositoryFactory)
        .add_factory("service", ServiceFactory)
        .add_module("retries", ModuleExport::value(json!(3)));
    Arc::new(catalog)
}

#[tokio::test]
async fn test_end_to_end_load_with_namespace() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write(temp_dir.path(), "app/service.yaml", "factory: service\n");
    write(temp_dir.path(), "app/data_repository.toml", "factory = \"repository\"\n");
    write(
        temp_dir.path(),
        "app/database.json",
        r#"{ "url": "postgres://localhost/app" }"#,
    );
    write(temp_dir.path(), "target/ignored.json", r#"{ "ignored": true }"#);

    let container = Arc::new(FountContainer::new());
    let loader = ModuleLoader::builder()
        .with_catalog(catalog())
        .with_defaults(
            LoaderConfig::new()
                .with_root(temp_dir.path())
                .with_namespace("app")
                .with_container(container.handle()),
        )
        .build()?;

    let outcome = loader
        .load(
            LoaderConfig::new()
                .with_patterns(["app/*.json", "app/*.toml", "app/*.yaml", "target/*.json"])
                .with_modules("retries"),
        )
        .await?;

    // 工厂自身的名称优先于文件名
    assert_eq!(
        outcome.loaded,
        vec!["app.database", "app.repository", "app.service", "retries"]
    );
    assert_eq!(outcome.report.passes, 1);
    assert!(outcome.report.forced.is_empty());

    // `database` 通过命名空间名 `app.database` 解析，`retries` 通过裸名解析
    let service = container.resolve_as::<Service>("app.service").await?;
    assert_eq!(service.repository.url, "postgres://localhost/app");
    assert_eq!(service.retries, 3);
    assert!(container.origin("app.service").is_some());
    Ok(())
}

#[tokio::test]
async fn test_manifest_overrides_name_and_dependencies() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write(
        temp_dir.path(),
        "modules/service.json",
        r#"{ "factory": "service", "dependencies": ["store", "retries"] }"#,
    );
    write(
        temp_dir.path(),
        "modules/store.toml",
        "factory = \"repository\"\nname = \"store\"\ndependencies = [\"settings\"]\n",
    );
    write(temp_dir.path(), "modules/settings.yaml", "url: sqlite://memory\n");

    let container = Arc::new(FountContainer::new());
    let loader = ModuleLoader::builder().with_catalog(catalog()).build()?;

    let outcome = loader
        .load(
            LoaderConfig::new()
                .with_root(temp_dir.path())
                .with_patterns("modules/*")
                .with_modules(["retries"])
                .with_container(container.handle()),
        )
        .await?;

    assert_eq!(outcome.loaded, vec!["service", "settings", "store", "retries"]);
    assert_eq!(outcome.report.passes, 2);
    assert!(outcome.report.forced.is_empty());

    let service = container.resolve_as::<Service>("service").await?;
    assert_eq!(service.repository.url, "sqlite://memory");
    assert_eq!(service.retries, 3);
    Ok(())
}

#[tokio::test]
async fn test_unsatisfiable_graph_is_force_registered() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write(temp_dir.path(), "modules/service.json", r#"{ "factory": "service" }"#);

    let container = Arc::new(FountContainer::new());
    let loader = ModuleLoader::builder().with_catalog(catalog()).build()?;

    let outcome = loader
        .load(
            LoaderConfig::new()
                .with_root(temp_dir.path())
                .with_patterns("modules/*.json")
                .with_container(container.handle()),
        )
        .await?;

    assert_eq!(outcome.loaded, vec!["service"]);
    assert_eq!(outcome.report.forced, vec!["service"]);
    assert_eq!(outcome.report.passes, 2);

    let registration = container.registration("service").expect("service registered");
    assert!(registration.export.is_function());
    assert!(registration.origin.is_none());
    Ok(())
}

#[tokio::test]
async fn test_zero_dependency_factory_failure_aborts_load() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    write(
        temp_dir.path(),
        "modules/repository.json",
        r#"{ "factory": "repository", "dependencies": [] }"#,
    );

    let container = Arc::new(FountContainer::new());
    let loader = ModuleLoader::builder().with_catalog(catalog()).build()?;

    let error = loader
        .load(
            LoaderConfig::new()
                .with_root(temp_dir.path())
                .with_patterns("modules/*.json")
                .with_container(container.handle()),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, LoaderError::Factory { ref name, .. } if name == "repository"));
    Ok(())
}
