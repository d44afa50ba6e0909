//! # 模块加载器
//!
//! 基于约定的模块自动加载与依赖注入。按匹配模式发现模块清单，
//! 推导注册名与依赖列表，然后多轮注册到依赖注入容器中。
//!
//! ## 主要功能
//!
//! - **模块发现**: 用 glob 模式展开候选文件
//! - **清单读取**: JSON / TOML / YAML 清单，工厂引用导出目录
//! - **多轮注册**: 依赖就绪后注入，无法收敛时强制注册
//! - **配置管理**: 初始化默认值与单次调用配置浅合并
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use module_loader::{LoaderConfig, ModuleLoader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ModuleLoader::initialize(LoaderConfig::new().with_namespace("app"));
//!
//!     let outcome = loader
//!         .load(LoaderConfig::new().with_patterns(["modules/**/*.json", "modules/**/*.toml"]))
//!         .await?;
//!
//!     println!("已加载: {:?}", outcome.loaded);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;
pub mod discovery;
pub mod loader;
pub mod reader;
pub mod registrar;

#[cfg(test)]
mod tests;

// 重新导出主要类型
pub use builder::{LoggingConfig, ModuleLoaderBuilder};
pub use config_sources::{LoaderConfig, PatternList};
pub use discovery::GlobDiscovery;
pub use loader::{LoadOutcome, ModuleLoader};
pub use reader::{load_modules, LoadCache, ManifestFormat, ManifestReader};
pub use registrar::{Registrar, RegistrationReport, MAX_STALLED_PASSES};

// 重新导出错误类型
pub use infrastructure_common::LoaderError;
