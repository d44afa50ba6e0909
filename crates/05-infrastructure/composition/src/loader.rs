//! 模块加载入口

use crate::builder::ModuleLoaderBuilder;
use crate::config_sources::LoaderConfig;
use crate::discovery::GlobDiscovery;
use crate::reader::{load_modules, LoadCache, ManifestReader};
use crate::registrar::{Registrar, RegistrationReport};
use di_abstractions::{
    ContainerHandle, DiscoveryCriteria, ExportCatalog, ModuleDiscovery, ModuleReader, Registration,
};
use infrastructure_common::{LoaderError, LoaderResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 一次加载的结果
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// 已处理的注册名，其后是外部模块标识
    pub loaded: Vec<String>,
    /// 使用的容器
    pub container: ContainerHandle,
    /// 注册统计
    pub report: RegistrationReport,
}

/// 模块加载器
///
/// 持有初始化时的默认配置，每次 [`load`](Self::load) 将调用配置浅合并到默认值之上
pub struct ModuleLoader {
    defaults: LoaderConfig,
    catalog: Arc<ExportCatalog>,
    discovery: Arc<dyn ModuleDiscovery>,
    reader: Arc<dyn ModuleReader>,
}

impl ModuleLoader {
    /// 使用默认配置初始化加载器
    pub fn initialize(defaults: LoaderConfig) -> Self {
        let catalog = Arc::new(ExportCatalog::new());
        let reader = Arc::new(ManifestReader::new(catalog.clone()));
        Self::from_parts(defaults, catalog, Arc::new(GlobDiscovery::new()), reader)
    }

    /// 创建构建器
    pub fn builder() -> ModuleLoaderBuilder {
        ModuleLoaderBuilder::new()
    }

    pub(crate) fn from_parts(
        defaults: LoaderConfig,
        catalog: Arc<ExportCatalog>,
        discovery: Arc<dyn ModuleDiscovery>,
        reader: Arc<dyn ModuleReader>,
    ) -> Self {
        Self {
            defaults,
            catalog,
            discovery,
            reader,
        }
    }

    /// 初始化时的默认配置
    pub fn defaults(&self) -> &LoaderConfig {
        &self.defaults
    }

    /// 导出目录
    pub fn catalog(&self) -> &Arc<ExportCatalog> {
        &self.catalog
    }

    /// 加载模块，使用新的加载缓存
    pub async fn load(&self, config: LoaderConfig) -> LoaderResult<LoadOutcome> {
        let mut cache = LoadCache::new();
        self.load_with_cache(config, &mut cache).await
    }

    /// 加载模块，使用调用方持有的加载缓存
    pub async fn load_with_cache(
        &self,
        config: LoaderConfig,
        cache: &mut LoadCache,
    ) -> LoaderResult<LoadOutcome> {
        let effective = config.merged_over(&self.defaults);
        let container = effective.effective_container();
        let namespace = effective.effective_namespace().map(str::to_string);
        let modules = effective.module_list();
        let patterns = effective.pattern_list();

        info!(
            "开始加载模块: patterns={:?}, modules={:?}, namespace={:?}",
            patterns, modules, namespace
        );

        for identifier in &modules {
            self.register_external(&container, identifier)?;
        }

        let criteria = DiscoveryCriteria::new(effective.effective_root()).with_patterns(patterns);
        let candidates = self.discovery.discover(&criteria).await?;
        debug!("发现 {} 个候选模块", candidates.len());

        let descriptors = load_modules(self.reader.as_ref(), candidates, cache).await;

        let registrar = Registrar::new(container.clone(), namespace);
        let mut loaded: Vec<String> = descriptors
            .iter()
            .map(|module| registrar.registration_name(module))
            .collect();
        let report = registrar.register_all(descriptors).await?;
        loaded.extend(modules);

        info!(
            "模块加载完成: {} 个模块, {} 轮, 强制注册 {}",
            loaded.len(),
            report.passes,
            report.forced.len()
        );

        Ok(LoadOutcome {
            loaded,
            container,
            report,
        })
    }

    /// 以标识注册外部模块，不记录来源
    fn register_external(&self, container: &ContainerHandle, identifier: &str) -> LoaderResult<()> {
        let export = self
            .catalog
            .module(identifier)
            .ok_or_else(|| LoaderError::ModuleNotFound {
                identifier: identifier.to_string(),
            })?;

        debug!("注册外部模块: {}", identifier);
        container.register(identifier, Registration::new(export));
        Ok(())
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("defaults", &self.defaults)
            .field("catalog", &self.catalog)
            .field("discovery", &self.discovery.name())
            .field("reader", &self.reader.name())
            .finish()
    }
}
