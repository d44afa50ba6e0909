//! 加载器配置
//!
//! 提供加载配置的定义、默认值合并，以及基于文件与环境变量的分层加载

use di_abstractions::ContainerHandle;
use infrastructure_common::{ConfigError, ConfigResult, NamingConventions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认搜索根目录
pub const DEFAULT_ROOT: &str = ".";

/// 单个字符串或字符串列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    /// 单个值
    One(String),
    /// 多个值
    Many(Vec<String>),
}

impl PatternList {
    /// 规范化为列表
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

impl From<&str> for PatternList {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for PatternList {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for PatternList {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for PatternList {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PatternList {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// 加载配置
///
/// 所有字段都是可选的，单次调用的配置按字段浅合并到初始化默认值之上
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// 模块文件匹配模式
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<PatternList>,
    /// 外部模块标识
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<PatternList>,
    /// 注册名的命名空间前缀
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// 搜索根目录
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// 目标容器，未设置时使用进程级默认容器
    #[serde(skip)]
    pub container: Option<ContainerHandle>,
}

impl LoaderConfig {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置匹配模式
    pub fn with_patterns(mut self, patterns: impl Into<PatternList>) -> Self {
        self.patterns = Some(patterns.into());
        self
    }

    /// 设置外部模块
    pub fn with_modules(mut self, modules: impl Into<PatternList>) -> Self {
        self.modules = Some(modules.into());
        self
    }

    /// 设置命名空间
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// 设置搜索根目录
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    /// 设置目标容器
    pub fn with_container(mut self, container: ContainerHandle) -> Self {
        self.container = Some(container);
        self
    }

    /// 浅合并：本配置已设置的字段优先，其余取默认值
    pub fn merged_over(&self, defaults: &LoaderConfig) -> LoaderConfig {
        LoaderConfig {
            patterns: self.patterns.clone().or_else(|| defaults.patterns.clone()),
            modules: self.modules.clone().or_else(|| defaults.modules.clone()),
            namespace: self.namespace.clone().or_else(|| defaults.namespace.clone()),
            root: self.root.clone().or_else(|| defaults.root.clone()),
            container: self.container.clone().or_else(|| defaults.container.clone()),
        }
    }

    /// 规范化后的匹配模式
    pub fn pattern_list(&self) -> Vec<String> {
        self.patterns.as_ref().map(PatternList::to_vec).unwrap_or_default()
    }

    /// 规范化后的外部模块列表
    pub fn module_list(&self) -> Vec<String> {
        self.modules.as_ref().map(PatternList::to_vec).unwrap_or_default()
    }

    /// 有效的命名空间（空字符串视为未设置）
    pub fn effective_namespace(&self) -> Option<&str> {
        NamingConventions::normalize_namespace(self.namespace.as_deref())
    }

    /// 有效的搜索根目录
    pub fn effective_root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))
    }

    /// 有效的容器
    pub fn effective_container(&self) -> ContainerHandle {
        self.container
            .clone()
            .unwrap_or_else(|| di_impl::default_container().handle())
    }

    /// 从配置文件与环境变量分层加载
    ///
    /// 环境变量覆盖文件中的值，列表字段使用逗号分隔，如 `<PREFIX>_PATTERNS=a/*.json,b/*.toml`
    pub fn from_sources(file: Option<&Path>, env_prefix: Option<&str>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("添加加载器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        if let Some(prefix) = env_prefix {
            info!("添加环境变量配置源，前缀: {}", prefix);
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("patterns")
                    .with_list_parse_key("modules"),
            );
        }

        let settings = builder.build().map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;

        let loaded: LoaderConfig =
            settings
                .try_deserialize()
                .map_err(|e| ConfigError::ParseError {
                    source: Box::new(e),
                })?;

        debug!("加载器配置: {:?}", loaded);
        Ok(loaded)
    }
}
