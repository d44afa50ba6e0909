//! 依赖注入容器抽象接口
//!
//! 加载器只通过这里定义的能力操作容器：查询、注册、注入

use crate::factory::{Instance, ModuleExport, ModuleFactory};
use async_trait::async_trait;
use infrastructure_common::DependencyError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 容器中的一条注册
#[derive(Debug, Clone)]
pub struct Registration {
    /// 注册的导出
    pub export: ModuleExport,
    /// 来源文件（仅用于诊断）
    pub origin: Option<PathBuf>,
}

impl Registration {
    /// 创建新的注册
    pub fn new(export: ModuleExport) -> Self {
        Self {
            export,
            origin: None,
        }
    }

    /// 注册普通实例
    pub fn instance(instance: Instance) -> Self {
        Self::new(ModuleExport::Value(instance))
    }

    /// 标记来源文件
    pub fn with_origin(mut self, origin: impl AsRef<Path>) -> Self {
        self.origin = Some(origin.as_ref().to_path_buf());
        self
    }
}

/// 依赖注入容器 trait
#[async_trait]
pub trait Container: Send + Sync {
    /// 检查名称是否可以解析
    fn can_resolve(&self, name: &str) -> bool;

    /// 注册（同名时后注册者覆盖先注册者）
    fn register(&self, name: &str, registration: Registration);

    /// 解析名称对应的实例
    async fn resolve(&self, name: &str) -> Result<Instance, DependencyError>;

    /// 按给定的参数名解析实参并调用工厂
    async fn inject(
        &self,
        arg_names: &[String],
        factory: Arc<dyn ModuleFactory>,
    ) -> Result<Instance, DependencyError>;
}

/// 上下文解析作用域
pub trait ResolveScope: Send + Sync {
    /// 检查名称在该上下文中是否可以解析
    fn can_resolve(&self, name: &str) -> bool;
}

/// 支持按模块上下文解析的容器
pub trait ContextualContainer: Container {
    /// 获取指定模块名的解析作用域
    fn context(&self, name: &str) -> Box<dyn ResolveScope + '_>;
}

/// 容器句柄
///
/// 在配置阶段确定容器是否提供上下文解析能力
#[derive(Clone)]
pub enum ContainerHandle {
    /// 普通容器
    Simple(Arc<dyn Container>),
    /// 支持上下文解析的容器
    Contextual(Arc<dyn ContextualContainer>),
}

impl ContainerHandle {
    /// 包装普通容器
    pub fn simple<C>(container: Arc<C>) -> Self
    where
        C: Container + 'static,
    {
        Self::Simple(container)
    }

    /// 包装上下文容器
    pub fn contextual<C>(container: Arc<C>) -> Self
    where
        C: ContextualContainer + 'static,
    {
        Self::Contextual(container)
    }

    /// 是否支持上下文解析
    pub fn supports_context(&self) -> bool {
        matches!(self, Self::Contextual(_))
    }

    /// 检查名称是否可以解析
    pub fn can_resolve(&self, name: &str) -> bool {
        match self {
            Self::Simple(container) => container.can_resolve(name),
            Self::Contextual(container) => container.can_resolve(name),
        }
    }

    /// 在模块上下文中检查名称；普通容器总是返回 false
    pub fn can_resolve_in_context(&self, context: &str, name: &str) -> bool {
        match self {
            Self::Simple(_) => false,
            Self::Contextual(container) => container.context(context).can_resolve(name),
        }
    }

    /// 注册
    pub fn register(&self, name: &str, registration: Registration) {
        match self {
            Self::Simple(container) => container.register(name, registration),
            Self::Contextual(container) => container.register(name, registration),
        }
    }

    /// 解析实例
    pub async fn resolve(&self, name: &str) -> Result<Instance, DependencyError> {
        match self {
            Self::Simple(container) => container.resolve(name).await,
            Self::Contextual(container) => container.resolve(name).await,
        }
    }

    /// 注入并调用工厂
    pub async fn inject(
        &self,
        arg_names: &[String],
        factory: Arc<dyn ModuleFactory>,
    ) -> Result<Instance, DependencyError> {
        match self {
            Self::Simple(container) => container.inject(arg_names, factory).await,
            Self::Contextual(container) => container.inject(arg_names, factory).await,
        }
    }
}

impl fmt::Debug for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(_) => f.write_str("ContainerHandle::Simple(..)"),
            Self::Contextual(_) => f.write_str("ContainerHandle::Contextual(..)"),
        }
    }
}
