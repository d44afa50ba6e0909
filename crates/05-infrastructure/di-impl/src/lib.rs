//! # 依赖注入具体实现
//!
//! 提供默认的内存容器 [`FountContainer`]，以及进程级默认容器实例

use async_trait::async_trait;
use dashmap::DashMap;
use di_abstractions::{
    Container, ContainerHandle, ContextualContainer, Instance, ModuleExport, ModuleFactory,
    Registration, ResolveContext, ResolveOptions, ResolveScope,
};
use futures::future::BoxFuture;
use infrastructure_common::{DependencyError, DependencyResult, NamingConventions};
use once_cell::sync::Lazy;
use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, trace};

/// 进程级默认容器
static DEFAULT_CONTAINER: Lazy<Arc<FountContainer>> = Lazy::new(|| Arc::new(FountContainer::new()));

/// 获取进程级默认容器
pub fn default_container() -> Arc<FountContainer> {
    DEFAULT_CONTAINER.clone()
}

/// 内存依赖注入容器
///
/// 按名称保存注册。普通值直接返回；工厂在每次解析时按形参名
/// 递归解析依赖后调用，结果不缓存。
pub struct FountContainer {
    /// 名称 -> 注册
    registrations: DashMap<String, Registration>,
    /// 解析选项
    options: ResolveOptions,
}

impl FountContainer {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_options(ResolveOptions::default())
    }

    /// 使用指定解析选项创建容器
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            registrations: DashMap::new(),
            options,
        }
    }

    /// 包装为上下文容器句柄
    pub fn handle(self: &Arc<Self>) -> ContainerHandle {
        ContainerHandle::contextual(self.clone())
    }

    /// 获取注册信息
    pub fn registration(&self, name: &str) -> Option<Registration> {
        self.registrations.get(name).map(|entry| entry.value().clone())
    }

    /// 获取注册的来源文件
    pub fn origin(&self, name: &str) -> Option<PathBuf> {
        self.registrations
            .get(name)
            .and_then(|entry| entry.value().origin.clone())
    }

    /// 已注册的名称（排序后）
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registrations
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// 注册数量
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// 清空容器
    pub fn clear(&self) {
        self.registrations.clear();
    }

    /// 解析并向下转型为具体类型
    pub async fn resolve_as<T>(&self, name: &str) -> DependencyResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let instance = Container::resolve(self, name).await?;
        instance
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    fn resolve_with<'a>(
        &'a self,
        name: &'a str,
        context: &'a mut ResolveContext,
    ) -> BoxFuture<'a, DependencyResult<Instance>> {
        Box::pin(async move {
            let registration = self.registration(name).ok_or_else(|| {
                DependencyError::ComponentNotRegistered {
                    name: name.to_string(),
                }
            })?;

            match registration.export {
                ModuleExport::Value(instance) => Ok(instance),
                ModuleExport::Factory(factory) => {
                    context.push_name(name)?;
                    trace!("解析工厂组件: {} (深度 {})", name, context.depth());

                    let mut args = Vec::new();
                    for param in factory.params() {
                        args.push(self.resolve_with(&param, context).await?);
                    }
                    context.pop_name();

                    factory
                        .create(args)
                        .await
                        .map_err(|source| DependencyError::ComponentCreationFailed {
                            name: name.to_string(),
                            source,
                        })
                }
            }
        })
    }
}

impl Default for FountContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FountContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FountContainer")
            .field("registrations", &self.registered_names())
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl Container for FountContainer {
    fn can_resolve(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    fn register(&self, name: &str, registration: Registration) {
        let kind = if registration.export.is_function() {
            "工厂"
        } else {
            "实例"
        };
        if self
            .registrations
            .insert(name.to_string(), registration)
            .is_some()
        {
            debug!("覆盖已注册组件: {} ({})", name, kind);
        } else {
            debug!("注册组件: {} ({})", name, kind);
        }
    }

    async fn resolve(&self, name: &str) -> DependencyResult<Instance> {
        let mut context = ResolveContext::with_options(self.options.clone());
        self.resolve_with(name, &mut context).await
    }

    async fn inject(
        &self,
        arg_names: &[String],
        factory: Arc<dyn ModuleFactory>,
    ) -> DependencyResult<Instance> {
        let factory_name = factory.name().unwrap_or("<anonymous>").to_string();
        debug!("注入组件依赖: {} <- {:?}", factory_name, arg_names);

        let mut args = Vec::with_capacity(arg_names.len());
        for arg_name in arg_names {
            let mut context = ResolveContext::with_options(self.options.clone());
            args.push(self.resolve_with(arg_name, &mut context).await?);
        }

        factory
            .create(args)
            .await
            .map_err(|source| DependencyError::ComponentCreationFailed {
                name: factory_name,
                source,
            })
    }
}

/// 以模块名为上下文的解析作用域
struct ModuleScope<'a> {
    container: &'a FountContainer,
    context: String,
}

impl ResolveScope for ModuleScope<'_> {
    fn can_resolve(&self, name: &str) -> bool {
        self.container
            .can_resolve(&NamingConventions::scoped_name(&self.context, name))
    }
}

impl ContextualContainer for FountContainer {
    fn context(&self, name: &str) -> Box<dyn ResolveScope + '_> {
        Box::new(ModuleScope {
            container: self,
            context: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::FnFactory;
    use infrastructure_common::FactoryError;

    fn counter_factory(params: &[&str]) -> FnFactory {
        let count = params.len();
        FnFactory::new(params.iter().map(|p| p.to_string()), move |args: Vec<Instance>| async move {
            assert_eq!(args.len(), count);
            Ok::<Instance, FactoryError>(Arc::new(args.len()))
        })
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let container = FountContainer::new();
        container.register("port", Registration::instance(Arc::new(80_u16)));
        container.register("port", Registration::instance(Arc::new(8080_u16)));

        assert_eq!(container.len(), 1);
        assert_eq!(*container.resolve_as::<u16>("port").await.unwrap(), 8080);
    }

    #[tokio::test]
    async fn test_factory_entry_resolves_params_by_bare_name() {
        let container = FountContainer::new();
        container.register("a", Registration::instance(Arc::new(1_u8)));
        container.register("b", Registration::instance(Arc::new(2_u8)));
        container.register(
            "sum",
            Registration::new(ModuleExport::factory(counter_factory(&["a", "b"]))),
        );

        assert_eq!(*container.resolve_as::<usize>("sum").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_factory_cycle_is_reported() {
        let container = FountContainer::new();
        container.register(
            "a",
            Registration::new(ModuleExport::factory(counter_factory(&["b"]))),
        );
        container.register(
            "b",
            Registration::new(ModuleExport::factory(counter_factory(&["a"]))),
        );

        let error = Container::resolve(&container, "a").await.unwrap_err();
        assert!(matches!(error, DependencyError::CircularDependency { .. }));
    }

    #[test]
    fn test_context_scope_uses_module_prefix() {
        let container = FountContainer::new();
        container.register("server.port", Registration::instance(Arc::new(80_u16)));

        assert!(container.context("server").can_resolve("port"));
        assert!(!container.context("client").can_resolve("port"));
    }

    #[tokio::test]
    async fn test_resolve_as_reports_type_mismatch() {
        let container = FountContainer::new();
        container.register("name", Registration::instance(Arc::new("fount".to_string())));

        let error = container.resolve_as::<u32>("name").await.unwrap_err();
        assert!(matches!(error, DependencyError::TypeMismatch { .. }));
    }
}
