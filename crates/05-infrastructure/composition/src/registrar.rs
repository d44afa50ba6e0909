//! 多轮依赖注册
//!
//! 每一轮并发尝试注册剩余的全部模块，依赖尚不可解析的模块留到下一轮。
//! 没有进展的轮次累计两次后，剩余模块以原始导出强制注册。

use di_abstractions::{ContainerHandle, ModuleDescriptor, ModuleExport, Registration};
use futures::future::join_all;
use infrastructure_common::{LoaderError, LoaderResult, NamingConventions};
use tracing::{debug, info, trace, warn};

/// 触发强制注册的停滞轮次数
pub const MAX_STALLED_PASSES: usize = 2;

/// 注册结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// 执行的轮次数
    pub passes: usize,
    /// 正常注册的模块（按完成顺序）
    pub injected: Vec<String>,
    /// 强制注册的模块
    pub forced: Vec<String>,
}

/// 单次注册尝试的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Registered,
    Deferred,
}

/// 模块注册器
#[derive(Debug, Clone)]
pub struct Registrar {
    container: ContainerHandle,
    namespace: Option<String>,
}

impl Registrar {
    /// 创建注册器，空命名空间视为未设置
    pub fn new(container: ContainerHandle, namespace: Option<String>) -> Self {
        Self {
            container,
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// 命名空间
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// 容器句柄
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    /// 模块的注册名
    pub fn registration_name(&self, module: &ModuleDescriptor) -> String {
        module.registration_name(self.namespace())
    }

    /// 注册整批模块
    ///
    /// 只有无依赖工厂执行失败会中止注册，其余情况总会终止于全部注册或强制注册
    pub async fn register_all(
        &self,
        modules: Vec<ModuleDescriptor>,
    ) -> LoaderResult<RegistrationReport> {
        let mut report = RegistrationReport::default();
        let mut remaining = modules;
        let mut stalled_passes = 0;

        while stalled_passes < MAX_STALLED_PASSES && !remaining.is_empty() {
            let before = remaining.len();
            report.passes += 1;

            let (registered, deferred) = self.run_pass(remaining).await?;
            info!(
                "第 {} 轮注册完成: 成功 {}, 待定 {}",
                report.passes,
                registered.len(),
                deferred.len()
            );

            if deferred.len() == before {
                stalled_passes += 1;
                debug!("第 {} 轮没有进展 (累计 {} 次)", report.passes, stalled_passes);
            }

            report.injected.extend(registered);
            remaining = deferred;
        }

        for module in &remaining {
            report.forced.push(self.force_register(module));
        }

        Ok(report)
    }

    /// 执行一轮注册，返回已注册的名称与待定模块
    ///
    /// 各次尝试按批次顺序轮询，同一轮中先完成注入的模块对排在后面的模块立即可见，
    /// 依赖按批次顺序排列的图只需一轮。
    async fn run_pass(
        &self,
        batch: Vec<ModuleDescriptor>,
    ) -> LoaderResult<(Vec<String>, Vec<ModuleDescriptor>)> {
        let attempts = join_all(batch.iter().map(|module| self.try_register(module))).await;

        let mut registered = Vec::new();
        let mut deferred = Vec::new();
        for (module, attempt) in batch.into_iter().zip(attempts) {
            match attempt? {
                Attempt::Registered => registered.push(self.registration_name(&module)),
                Attempt::Deferred => deferred.push(module),
            }
        }

        Ok((registered, deferred))
    }

    /// 尝试注册单个模块
    async fn try_register(&self, module: &ModuleDescriptor) -> LoaderResult<Attempt> {
        let name = self.registration_name(module);

        let factory = match &module.export {
            ModuleExport::Value(instance) => {
                self.container.register(
                    &name,
                    Registration::instance(instance.clone()).with_origin(&module.path),
                );
                return Ok(Attempt::Registered);
            }
            ModuleExport::Factory(factory) => factory.clone(),
        };

        if module.dependencies.is_empty() {
            let instance = factory
                .create(Vec::new())
                .await
                .map_err(|source| LoaderError::Factory {
                    name: name.clone(),
                    source,
                })?;
            self.container
                .register(&name, Registration::instance(instance).with_origin(&module.path));
            return Ok(Attempt::Registered);
        }

        let mut arg_names = Vec::with_capacity(module.dependencies.len());
        for dependency in &module.dependencies {
            match self.resolve_argument(module, dependency) {
                Some(arg_name) => arg_names.push(arg_name),
                None => {
                    trace!("模块 {} 的依赖 {} 暂不可解析", name, dependency);
                    return Ok(Attempt::Deferred);
                }
            }
        }

        match self.container.inject(&arg_names, factory).await {
            Ok(instance) => {
                self.container
                    .register(&name, Registration::instance(instance).with_origin(&module.path));
                Ok(Attempt::Registered)
            }
            Err(e) => {
                warn!("模块 {} 注入失败，留待下一轮: {}", name, e);
                Ok(Attempt::Deferred)
            }
        }
    }

    /// 为依赖参数选择候选名
    ///
    /// 依次尝试：模块上下文、限定名、命名空间名、裸名。
    /// 上下文命中时使用限定名。
    pub fn resolve_argument(&self, module: &ModuleDescriptor, dependency: &str) -> Option<String> {
        let qualified = module.qualified_name(self.namespace(), dependency);

        if self.container.can_resolve_in_context(&module.name, dependency) {
            debug!("依赖 {} 在模块 {} 上下文中解析为 {}", dependency, module.name, qualified);
            return Some(qualified);
        }
        if self.container.can_resolve(&qualified) {
            debug!("依赖 {} 解析为限定名 {}", dependency, qualified);
            return Some(qualified);
        }
        if let Some(namespaced) = NamingConventions::namespace_name(self.namespace(), dependency) {
            if self.container.can_resolve(&namespaced) {
                debug!("依赖 {} 解析为命名空间名 {}", dependency, namespaced);
                return Some(namespaced);
            }
        }
        if self.container.can_resolve(dependency) {
            debug!("依赖 {} 解析为裸名", dependency);
            return Some(dependency.to_string());
        }

        None
    }

    /// 以原始导出强制注册，不记录来源
    fn force_register(&self, module: &ModuleDescriptor) -> String {
        let name = self.registration_name(module);
        warn!(
            "模块 {} 的依赖无法解析 {:?}，以原始导出强制注册",
            name, module.dependencies
        );
        self.container
            .register(&name, Registration::new(module.export.clone()));
        name
    }
}
