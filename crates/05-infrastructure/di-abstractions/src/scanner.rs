//! 模块读取抽象接口
//!
//! 将候选路径读取为模块描述符

use crate::discovery::ModulePath;
use crate::factory::ModuleExport;
use async_trait::async_trait;
use infrastructure_common::{LoadError, NamingConventions};
use std::path::{Path, PathBuf};

/// 模块描述符
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// 模块名
    pub name: String,
    /// 模块导出
    pub export: ModuleExport,
    /// 声明的依赖（按形参顺序）
    pub dependencies: Vec<String>,
    /// 来源路径
    pub path: PathBuf,
}

impl ModuleDescriptor {
    /// 创建描述符，依赖取自导出声明的形参
    pub fn new(name: impl Into<String>, export: ModuleExport, path: impl Into<PathBuf>) -> Self {
        let dependencies = export.declared_params();
        Self {
            name: name.into(),
            export,
            dependencies,
            path: path.into(),
        }
    }

    /// 覆盖依赖列表
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// 导出是否可调用
    pub fn is_function(&self) -> bool {
        self.export.is_function()
    }

    /// 模块的注册名
    pub fn registration_name(&self, namespace: Option<&str>) -> String {
        NamingConventions::registration_name(namespace, &self.name)
    }

    /// 依赖参数的限定名
    pub fn qualified_name(&self, namespace: Option<&str>, argument: &str) -> String {
        NamingConventions::qualified_name(namespace, &self.name, argument)
    }
}

/// 推导模块名：显式名称 > 导出自身名称 > 去掉扩展名的文件名
pub fn derive_module_name(module: &ModulePath, export: &ModuleExport) -> String {
    module
        .name
        .clone()
        .or_else(|| export.own_name())
        .unwrap_or_else(|| file_stem(&module.path))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 模块读取器 trait
#[async_trait]
pub trait ModuleReader: Send + Sync {
    /// 读取模块
    async fn read(&self, module: &ModulePath) -> Result<ModuleDescriptor, LoadError>;

    /// 获取读取器名称
    fn name(&self) -> &str;

    /// 检查是否支持指定文件
    fn supports(&self, path: &Path) -> bool;
}
