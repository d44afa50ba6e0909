//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义模块加载器与容器之间的核心接口。
//!
//! ## 核心接口
//!
//! - [`Container`] / [`ContextualContainer`] - 容器接口
//! - [`ModuleFactory`] - 模块工厂接口
//! - [`ModuleDiscovery`] - 模块发现接口
//! - [`ModuleReader`] - 模块读取接口
//! - [`ExportCatalog`] - 宿主提供的工厂与外部模块目录

pub mod container;
pub mod discovery;
pub mod factory;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use container::*;
pub use discovery::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
pub use scanner::*;

// 供 `#[module_factory]` 生成的代码使用
#[doc(hidden)]
pub use async_trait::async_trait;
#[doc(hidden)]
pub use infrastructure_common::FactoryError;
