//! 模块清单读取与加载缓存
//!
//! 模块文件是 JSON / TOML / YAML 清单。带字符串 `factory` 键的对象引用
//! [`ExportCatalog`] 中的工厂，其余文档整体作为普通值导出。

use async_trait::async_trait;
use di_abstractions::{
    derive_module_name, ExportCatalog, ModuleDescriptor, ModuleExport, ModulePath, ModuleReader,
};
use infrastructure_common::{BoxedError, LoadError, LoadResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// 清单格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
    Yaml,
}

impl ManifestFormat {
    /// 根据扩展名判断格式
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn parse(self, path: &Path, content: &str) -> LoadResult<Value> {
        let parsed: Result<Value, BoxedError> = match self {
            Self::Json => serde_json::from_str(content).map_err(|e| Box::new(e) as BoxedError),
            Self::Toml => toml::from_str(content).map_err(|e| Box::new(e) as BoxedError),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| Box::new(e) as BoxedError),
        };
        parsed.map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 清单读取器
#[derive(Debug, Clone)]
pub struct ManifestReader {
    catalog: Arc<ExportCatalog>,
}

impl ManifestReader {
    /// 使用导出目录创建读取器
    pub fn new(catalog: Arc<ExportCatalog>) -> Self {
        Self { catalog }
    }

    /// 导出目录
    pub fn catalog(&self) -> &Arc<ExportCatalog> {
        &self.catalog
    }

    /// 将解析后的文档转换为模块描述符
    pub fn describe(&self, module: &ModulePath, document: Value) -> LoadResult<ModuleDescriptor> {
        let path = &module.path;

        let factory_id = document
            .get("factory")
            .and_then(Value::as_str)
            .map(str::to_string);

        let Some(factory_id) = factory_id else {
            let export = ModuleExport::value(document);
            let name = derive_module_name(module, &export);
            return Ok(ModuleDescriptor::new(name, export, path.clone()));
        };

        let factory = self
            .catalog
            .factory(&factory_id)
            .ok_or_else(|| LoadError::UnknownFactory {
                path: path.clone(),
                factory: factory_id.clone(),
            })?;

        let manifest_name = match document.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(_) => {
                return Err(LoadError::InvalidManifest {
                    path: path.clone(),
                    message: "name 必须是字符串".to_string(),
                })
            }
        };
        let dependencies = declared_dependencies(path, &document)?;

        let export = ModuleExport::Factory(factory);
        let name = match (&module.name, manifest_name) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(manifest_name)) => manifest_name,
            (None, None) => derive_module_name(module, &export),
        };

        let descriptor = ModuleDescriptor::new(name, export, path.clone());
        Ok(match dependencies {
            Some(dependencies) => descriptor.with_dependencies(dependencies),
            None => descriptor,
        })
    }
}

/// 清单中覆盖的依赖列表
fn declared_dependencies(path: &Path, document: &Value) -> LoadResult<Option<Vec<String>>> {
    let invalid = || LoadError::InvalidManifest {
        path: path.to_path_buf(),
        message: "dependencies 必须是字符串数组".to_string(),
    };

    match document.get("dependencies") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<LoadResult<Vec<_>>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

#[async_trait]
impl ModuleReader for ManifestReader {
    async fn read(&self, module: &ModulePath) -> LoadResult<ModuleDescriptor> {
        let format = ManifestFormat::from_path(&module.path).ok_or_else(|| {
            LoadError::UnsupportedFormat {
                path: module.path.clone(),
            }
        })?;

        let content = tokio::fs::read_to_string(&module.path)
            .await
            .map_err(|source| LoadError::Io {
                path: module.path.clone(),
                source,
            })?;

        let document = format.parse(&module.path, &content)?;
        self.describe(module, document)
    }

    fn name(&self) -> &str {
        "manifest"
    }

    fn supports(&self, path: &Path) -> bool {
        ManifestFormat::from_path(path).is_some()
    }
}

/// 单次加载运行的缓存
///
/// 由调用方持有。每个候选路径在读取前先失效旧条目，保证外部修改后重新加载。
#[derive(Debug, Default)]
pub struct LoadCache {
    entries: HashMap<PathBuf, ModuleDescriptor>,
}

impl LoadCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取缓存的描述符
    pub fn get(&self, path: &Path) -> Option<&ModuleDescriptor> {
        self.entries.get(path)
    }

    /// 写入描述符，返回被替换的旧条目
    pub fn insert(&mut self, path: PathBuf, descriptor: ModuleDescriptor) -> Option<ModuleDescriptor> {
        self.entries.insert(path, descriptor)
    }

    /// 失效指定路径
    pub fn invalidate(&mut self, path: &Path) -> Option<ModuleDescriptor> {
        self.entries.remove(path)
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 已缓存的路径（排序后）
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.keys().cloned().collect();
        paths.sort();
        paths
    }
}

/// 加载全部候选模块
///
/// 读取器不支持的文件直接跳过；单个模块加载失败只记录错误并跳过，其余模块继续加载
pub async fn load_modules(
    reader: &dyn ModuleReader,
    candidates: Vec<ModulePath>,
    cache: &mut LoadCache,
) -> Vec<ModuleDescriptor> {
    let mut descriptors = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if !reader.supports(&candidate.path) {
            debug!(
                "读取器 {} 不支持该文件，跳过: {}",
                reader.name(),
                candidate.path.display()
            );
            continue;
        }

        match load_module(reader, candidate, cache).await {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => error!("模块加载失败: {}, 错误: {}", e.path().display(), e),
        }
    }

    descriptors
}

async fn load_module(
    reader: &dyn ModuleReader,
    candidate: ModulePath,
    cache: &mut LoadCache,
) -> LoadResult<ModuleDescriptor> {
    let absolute = tokio::fs::canonicalize(&candidate.path)
        .await
        .map_err(|source| LoadError::Io {
            path: candidate.path.clone(),
            source,
        })?;

    if cache.invalidate(&absolute).is_some() {
        debug!("重新加载模块: {}", absolute.display());
    }

    let module = ModulePath {
        path: absolute.clone(),
        name: candidate.name,
    };
    let descriptor = reader.read(&module).await?;
    debug!(
        "加载模块: {} -> {} (依赖: {:?})",
        absolute.display(),
        descriptor.name,
        descriptor.dependencies
    );

    cache.insert(absolute, descriptor.clone());
    Ok(descriptor)
}
