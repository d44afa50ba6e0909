//! 模块加载器构建器

use crate::config_sources::LoaderConfig;
use crate::discovery::GlobDiscovery;
use crate::loader::ModuleLoader;
use crate::reader::ManifestReader;
use di_abstractions::{ExportCatalog, ModuleDiscovery, ModuleExport, ModuleFactory, ModuleReader};
use infrastructure_common::{LoaderError, LoaderResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// 模块加载器构建器
///
/// 使用建造者模式组装发现器、读取器、导出目录和默认配置
pub struct ModuleLoaderBuilder {
    /// 初始化默认配置
    defaults: LoaderConfig,
    /// 导出目录
    catalog: Arc<ExportCatalog>,
    /// 自定义发现器
    discovery: Option<Arc<dyn ModuleDiscovery>>,
    /// 自定义读取器
    reader: Option<Arc<dyn ModuleReader>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ModuleLoaderBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            defaults: LoaderConfig::default(),
            catalog: Arc::new(ExportCatalog::new()),
            discovery: None,
            reader: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 设置默认配置
    pub fn with_defaults(mut self, defaults: LoaderConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// 从配置文件与环境变量加载默认配置，覆盖已设置的默认值
    pub fn with_config_sources(
        mut self,
        file: Option<&Path>,
        env_prefix: Option<&str>,
    ) -> LoaderResult<Self> {
        let loaded = LoaderConfig::from_sources(file, env_prefix)?;
        self.defaults = loaded.merged_over(&self.defaults);
        Ok(self)
    }

    /// 使用共享的导出目录
    pub fn with_catalog(mut self, catalog: Arc<ExportCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    /// 注册工厂
    pub fn add_factory<F>(self, id: impl Into<String>, factory: F) -> Self
    where
        F: ModuleFactory + 'static,
    {
        let id = id.into();
        debug!("添加工厂: {}", id);
        self.catalog.add_factory(id, factory);
        self
    }

    /// 注册外部模块
    pub fn add_module(self, identifier: impl Into<String>, export: ModuleExport) -> Self {
        let identifier = identifier.into();
        debug!("添加外部模块: {}", identifier);
        self.catalog.add_module(identifier, export);
        self
    }

    /// 使用自定义发现器
    pub fn with_discovery<T: ModuleDiscovery + 'static>(mut self, discovery: T) -> Self {
        info!("使用自定义模块发现器: {}", discovery.name());
        self.discovery = Some(Arc::new(discovery));
        self
    }

    /// 使用自定义读取器
    pub fn with_reader<T: ModuleReader + 'static>(mut self, reader: T) -> Self {
        info!("使用自定义模块读取器: {}", reader.name());
        self.reader = Some(Arc::new(reader));
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建加载器
    pub fn build(self) -> LoaderResult<ModuleLoader> {
        // 只有在明确配置了日志时才初始化，避免测试中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        let discovery = self
            .discovery
            .unwrap_or_else(|| Arc::new(GlobDiscovery::new()));
        let reader = self
            .reader
            .unwrap_or_else(|| Arc::new(ManifestReader::new(self.catalog.clone())));

        info!(
            "模块加载器构建完成: 发现器 {}, 读取器 {}",
            discovery.name(),
            reader.name()
        );
        Ok(ModuleLoader::from_parts(
            self.defaults,
            self.catalog,
            discovery,
            reader,
        ))
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> LoaderResult<()> {
        let filter = match &self.logging_config.directives {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|e| LoaderError::Bootstrap {
                    message: format!("日志过滤规则无效: {}", e),
                })?
            }
            None => EnvFilter::default()
                .add_directive(LevelFilter::from_level(self.logging_config.level).into()),
        };

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| LoaderError::Bootstrap {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for ModuleLoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 过滤规则（如 `module_loader=debug`），设置后忽略 `level`
    pub directives: Option<String>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: None,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            directives: None,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            directives: None,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置过滤规则
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }
}
