//! # Infrastructure Common
//!
//! 模块加载器基础设施层的公共错误类型与命名约定。
//!
//! ## 核心内容
//!
//! - [`NamingConventions`] - 注册名、限定名与命名空间名的推导规则
//! - [`LoaderError`] - 加载器顶层错误
//! - [`DependencyError`] - 依赖解析错误
//! - [`LoadError`] - 单个模块的加载错误
//!
//! ## 设计原则
//!
//! - 命名推导是纯函数，相同输入总是得到相同注册名
//! - 单个模块的失败与整体失败使用不同的错误类型区分

pub mod conventions;
pub mod errors;

pub use conventions::*;
pub use errors::*;
