//! 模块工厂抽象接口
//!
//! 可调用的模块导出。工厂声明自己的形参名列表，加载器据此推断依赖。

use async_trait::async_trait;
use infrastructure_common::{FactoryError, FactoryResult};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// 容器中保存的实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 模块工厂 trait
///
/// `params` 返回有序的形参名，`create` 按相同顺序接收解析后的实参
#[async_trait]
pub trait ModuleFactory: Send + Sync {
    /// 工厂自身的名称（可选）
    fn name(&self) -> Option<&str> {
        None
    }

    /// 形参名列表
    fn params(&self) -> Vec<String>;

    /// 创建实例
    async fn create(&self, args: Vec<Instance>) -> FactoryResult<Instance>;
}

/// 工厂闭包返回的 future
pub type FactoryFuture = Pin<Box<dyn Future<Output = FactoryResult<Instance>> + Send>>;

type FactoryFn = Arc<dyn Fn(Vec<Instance>) -> FactoryFuture + Send + Sync>;

/// 基于闭包的工厂，显式声明依赖列表
#[derive(Clone)]
pub struct FnFactory {
    name: Option<String>,
    params: Vec<String>,
    creator: FactoryFn,
}

impl FnFactory {
    /// 创建新的闭包工厂
    pub fn new<I, S, F, Fut>(params: I, creator: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Vec<Instance>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FactoryResult<Instance>> + Send + 'static,
    {
        Self {
            name: None,
            params: params.into_iter().map(Into::into).collect(),
            creator: Arc::new(move |args| Box::pin(creator(args))),
        }
    }

    /// 设置工厂名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("creator", &"<function>")
            .finish()
    }
}

#[async_trait]
impl ModuleFactory for FnFactory {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn params(&self) -> Vec<String> {
        self.params.clone()
    }

    async fn create(&self, args: Vec<Instance>) -> FactoryResult<Instance> {
        (self.creator)(args).await
    }
}

/// 将实参向下转型为具体类型
pub fn downcast_argument<T>(argument: Instance, param: &str) -> FactoryResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    argument
        .downcast::<T>()
        .map_err(|_| FactoryError::argument_type_mismatch(param, std::any::type_name::<T>()))
}

/// 模块导出
///
/// 普通值直接注册；工厂需要先解析依赖再调用
#[derive(Clone)]
pub enum ModuleExport {
    /// 普通值
    Value(Instance),
    /// 可调用的工厂
    Factory(Arc<dyn ModuleFactory>),
}

impl ModuleExport {
    /// 包装普通值
    pub fn value<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::Value(Arc::new(value))
    }

    /// 包装工厂
    pub fn factory<F>(factory: F) -> Self
    where
        F: ModuleFactory + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    /// 导出是否可调用
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    /// 导出值自身携带的名称
    ///
    /// 工厂取 `name()`；JSON 对象取字符串类型的 `name` 字段
    pub fn own_name(&self) -> Option<String> {
        match self {
            Self::Factory(factory) => factory.name().map(str::to_string),
            Self::Value(instance) => instance
                .downcast_ref::<serde_json::Value>()
                .and_then(|value| value.get("name"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
        }
    }

    /// 导出声明的依赖（普通值没有依赖）
    pub fn declared_params(&self) -> Vec<String> {
        match self {
            Self::Factory(factory) => factory.params(),
            Self::Value(_) => Vec::new(),
        }
    }
}

impl fmt::Debug for ModuleExport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("ModuleExport::Value(..)"),
            Self::Factory(factory) => f
                .debug_struct("ModuleExport::Factory")
                .field("name", &factory.name())
                .field("params", &factory.params())
                .finish(),
        }
    }
}
