//! 导出目录
//!
//! 宿主程序提供的具名工厂与外部模块。模块清单通过工厂标识引用这里的工厂。

use crate::factory::{ModuleExport, ModuleFactory};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 导出目录
#[derive(Default)]
pub struct ExportCatalog {
    /// 工厂标识 -> 工厂
    factories: RwLock<HashMap<String, Arc<dyn ModuleFactory>>>,
    /// 外部模块标识 -> 导出
    modules: RwLock<HashMap<String, ModuleExport>>,
}

impl ExportCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工厂
    pub fn add_factory<F>(&self, id: impl Into<String>, factory: F) -> &Self
    where
        F: ModuleFactory + 'static,
    {
        self.add_shared_factory(id, Arc::new(factory))
    }

    /// 注册共享工厂
    pub fn add_shared_factory(&self, id: impl Into<String>, factory: Arc<dyn ModuleFactory>) -> &Self {
        self.factories.write().insert(id.into(), factory);
        self
    }

    /// 以工厂自身名称注册，没有名称时返回 false
    pub fn add_named_factory<F>(&self, factory: F) -> bool
    where
        F: ModuleFactory + 'static,
    {
        match factory.name().map(str::to_string) {
            Some(id) => {
                self.add_factory(id, factory);
                true
            }
            None => false,
        }
    }

    /// 查找工厂
    pub fn factory(&self, id: &str) -> Option<Arc<dyn ModuleFactory>> {
        self.factories.read().get(id).cloned()
    }

    /// 注册外部模块
    pub fn add_module(&self, identifier: impl Into<String>, export: ModuleExport) -> &Self {
        self.modules.write().insert(identifier.into(), export);
        self
    }

    /// 查找外部模块
    pub fn module(&self, identifier: &str) -> Option<ModuleExport> {
        self.modules.read().get(identifier).cloned()
    }

    /// 已注册的工厂标识（排序后）
    pub fn factory_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl fmt::Debug for ExportCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modules: Vec<String> = self.modules.read().keys().cloned().collect();
        modules.sort();
        f.debug_struct("ExportCatalog")
            .field("factories", &self.factory_ids())
            .field("modules", &modules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{FnFactory, Instance};
    use infrastructure_common::FactoryError;

    fn unit_factory() -> FnFactory {
        FnFactory::new(["config"], |_| async {
            Ok::<Instance, FactoryError>(Arc::new(()))
        })
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = ExportCatalog::new();
        catalog
            .add_factory("server", unit_factory())
            .add_module("runtime", ModuleExport::value(1_u32));

        assert!(catalog.factory("server").is_some());
        assert!(catalog.factory("client").is_none());
        assert!(catalog.module("runtime").is_some());
        assert_eq!(catalog.factory_ids(), vec!["server"]);
    }

    #[test]
    fn test_add_named_factory_requires_name() {
        let catalog = ExportCatalog::new();

        assert!(!catalog.add_named_factory(unit_factory()));
        assert!(catalog.add_named_factory(unit_factory().with_name("client")));
        assert_eq!(catalog.factory("client").unwrap().params(), vec!["config"]);
    }
}
