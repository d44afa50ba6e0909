//! 基于 glob 的模块发现

use async_trait::async_trait;
use di_abstractions::{DiscoveryCriteria, ModuleDiscovery, ModulePath};
use infrastructure_common::{DiscoveryError, DiscoveryResult};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, trace};

/// glob 模块发现器
///
/// 在阻塞线程池中展开匹配模式，只保留普通文件
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobDiscovery;

impl GlobDiscovery {
    /// 创建新的发现器
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleDiscovery for GlobDiscovery {
    async fn discover(&self, criteria: &DiscoveryCriteria) -> DiscoveryResult<Vec<ModulePath>> {
        if criteria.patterns.is_empty() {
            debug!("没有匹配模式，跳过模块发现");
            return Ok(Vec::new());
        }

        let criteria = criteria.clone();
        tokio::task::spawn_blocking(move || expand_patterns(&criteria))
            .await
            .map_err(|e| DiscoveryError::TaskFailed {
                message: e.to_string(),
            })?
    }

    fn name(&self) -> &str {
        "glob"
    }
}

/// 展开全部匹配模式，结果按首次出现顺序去重
fn expand_patterns(criteria: &DiscoveryCriteria) -> DiscoveryResult<Vec<ModulePath>> {
    let mut seen = HashSet::new();
    let mut modules = Vec::new();

    // 根目录按字面匹配，其中的 `[` `*` `?` 不参与展开
    let escaped_root = glob::Pattern::escape(&criteria.root.to_string_lossy());

    for pattern in &criteria.patterns {
        let full_pattern = if Path::new(pattern).is_absolute() {
            pattern.clone()
        } else {
            Path::new(&escaped_root)
                .join(pattern)
                .to_string_lossy()
                .into_owned()
        };
        trace!("展开匹配模式: {}", full_pattern);

        let entries = glob::glob(&full_pattern).map_err(|e| DiscoveryError::InvalidPattern {
            pattern: pattern.clone(),
            source: Box::new(e),
        })?;

        for entry in entries {
            let path = entry.map_err(|e| DiscoveryError::Unreadable {
                source: Box::new(e),
            })?;

            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&criteria.root).unwrap_or(&path);
            if criteria.is_excluded(relative) {
                trace!("排除路径: {}", path.display());
                continue;
            }

            if seen.insert(path.clone()) {
                modules.push(ModulePath::new(path));
            }
        }
    }

    debug!(
        "模块发现完成: {} 个模式, {} 个文件",
        criteria.patterns.len(),
        modules.len()
    );
    Ok(modules)
}
