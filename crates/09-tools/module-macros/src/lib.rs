//! # Module Macros
//!
//! 这个 crate 提供了把普通函数声明为模块工厂的过程宏。
//!
//! ## 核心宏
//!
//! - [`module_factory`] - 从函数签名生成 `ModuleFactory` 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use di_abstractions::{FactoryError, Instance};
//! use module_macros::module_factory;
//! use std::sync::Arc;
//!
//! #[module_factory(name = "server")]
//! pub async fn server(config: Instance, port: Arc<u16>) -> Result<Server, FactoryError> {
//!     Ok(Server::new(config, *port))
//! }
//!
//! // 生成 `ServerFactory`，其形参列表为 ["config", "port"]
//! catalog.add_factory("server", ServerFactory);
//! ```

use proc_macro::TokenStream;

mod factory;
mod utils;

/// 模块工厂宏
///
/// 保留原函数，并生成同可见性的 `<函数名帕斯卡形式>Factory` 单元结构体。
/// 函数形参名按顺序成为工厂的依赖列表。
///
/// # 参数
///
/// - `name = "custom_name"` - 自定义工厂名称（默认为函数名）
///
/// # 形参类型
///
/// - `Instance` - 原样传入解析到的实例
/// - `Arc<T>` - 向下转型为 `T`
/// - 其他类型 `T` - 向下转型后克隆，要求 `T: Clone`
///
/// 返回 `Result` 时错误经 `?` 转换为 `FactoryError`；返回 `Instance` 时不再包装。
///
/// # 示例
///
/// ```rust,ignore
/// #[module_factory]
/// fn logger(level: String) -> Logger {
///     Logger::new(level)
/// }
/// ```
#[proc_macro_attribute]
pub fn module_factory(args: TokenStream, input: TokenStream) -> TokenStream {
    factory::expand(args, input)
}
