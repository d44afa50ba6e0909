//! 解析上下文
//!
//! 记录递归解析链，用于检测循环依赖与限制解析深度

use infrastructure_common::DependencyError;

/// 解析上下文
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前解析链
    pub resolution_chain: Vec<String>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定选项创建解析上下文
    pub fn with_options(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 添加名称到解析链
    pub fn push_name(&mut self, name: &str) -> Result<(), DependencyError> {
        if self.resolution_chain.iter().any(|entry| entry == name) {
            return Err(DependencyError::CircularDependency {
                dependency_chain: format!("{} -> {}", self.resolution_chain.join(" -> "), name),
            });
        }
        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                name: name.to_string(),
                max_depth: self.options.max_depth,
            });
        }
        self.resolution_chain.push(name.to_string());
        Ok(())
    }

    /// 从解析链中移除最后一个名称
    pub fn pop_name(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }
}

/// 解析选项
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}
