//! 模块发现抽象接口
//!
//! 将匹配模式展开为候选模块路径

use async_trait::async_trait;
use infrastructure_common::{DiscoveryError, EXCLUDED_DIRECTORIES};
use std::path::{Path, PathBuf};

/// 候选模块路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    /// 文件路径
    pub path: PathBuf,
    /// 显式指定的模块名
    pub name: Option<String>,
}

impl ModulePath {
    /// 创建未命名的模块路径
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: None,
        }
    }

    /// 创建带显式名称的模块路径
    pub fn named(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
        }
    }
}

/// 发现条件
#[derive(Debug, Clone)]
pub struct DiscoveryCriteria {
    /// 搜索根目录
    pub root: PathBuf,
    /// 匹配模式
    pub patterns: Vec<String>,
    /// 排除的目录名
    pub exclusions: Vec<String>,
}

impl DiscoveryCriteria {
    /// 创建新的发现条件，使用默认排除目录
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            patterns: Vec::new(),
            exclusions: EXCLUDED_DIRECTORIES.iter().map(|dir| dir.to_string()).collect(),
        }
    }

    /// 添加匹配模式
    pub fn add_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// 批量添加匹配模式
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// 检查路径是否位于排除目录中
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .map(|segment| self.exclusions.iter().any(|excluded| excluded == segment))
                .unwrap_or(false)
        })
    }
}

impl Default for DiscoveryCriteria {
    fn default() -> Self {
        Self::new(".")
    }
}

/// 模块发现器 trait
#[async_trait]
pub trait ModuleDiscovery: Send + Sync {
    /// 发现模块，结果去重且保持首次出现的顺序
    async fn discover(&self, criteria: &DiscoveryCriteria) -> Result<Vec<ModulePath>, DiscoveryError>;

    /// 获取发现器名称
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_excludes_vcs_and_dependency_directories() {
        let criteria = DiscoveryCriteria::new(".").add_pattern("**/*.toml");

        assert!(criteria.is_excluded(Path::new("./.git/config.toml")));
        assert!(criteria.is_excluded(Path::new("web/node_modules/pkg/a.json")));
        assert!(!criteria.is_excluded(Path::new("modules/a.toml")));
        assert_eq!(criteria.patterns, vec!["**/*.toml"]);
    }
}
