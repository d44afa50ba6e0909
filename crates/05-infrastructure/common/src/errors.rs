//! 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 装箱的底层错误
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxedError },
}

/// 工厂调用错误类型
#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("工厂参数缺失: {param}")]
    MissingArgument { param: String },

    #[error("工厂参数类型不匹配: {param}, 期望 {expected}")]
    ArgumentTypeMismatch { param: String, expected: String },

    #[error("工厂执行失败: {message}")]
    Failed { message: String },

    #[error("工厂执行失败: {source}")]
    Other {
        #[from]
        source: BoxedError,
    },
}

impl FactoryError {
    /// 创建执行失败错误
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// 创建参数缺失错误
    pub fn missing_argument(param: impl Into<String>) -> Self {
        Self::MissingArgument {
            param: param.into(),
        }
    }

    /// 创建参数类型不匹配错误
    pub fn argument_type_mismatch(param: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ArgumentTypeMismatch {
            param: param.into(),
            expected: expected.into(),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {name}")]
    ComponentNotRegistered { name: String },

    #[error("组件创建失败: {name}, 原因: {source}")]
    ComponentCreationFailed {
        name: String,
        #[source]
        source: FactoryError,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CircularDependency { dependency_chain: String },

    #[error("解析深度超过限制: {name}, 最大深度 {max_depth}")]
    ResolutionDepthExceeded { name: String, max_depth: usize },

    #[error("组件类型不匹配: {name}, 期望 {expected}")]
    TypeMismatch { name: String, expected: String },
}

/// 模块加载错误类型
///
/// 只影响单个模块，加载器记录后跳过该模块
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("模块文件读取失败: {path}, 原因: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("模块文件格式不支持: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("模块文件解析失败: {path}, 原因: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxedError,
    },

    #[error("模块清单无效: {path}, 原因: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("工厂未注册: {factory} (模块 {path})")]
    UnknownFactory { path: PathBuf, factory: String },
}

impl LoadError {
    /// 获取出错模块的路径
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::Parse { path, .. }
            | Self::InvalidManifest { path, .. }
            | Self::UnknownFactory { path, .. } => path,
        }
    }
}

/// 模块发现错误类型
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("匹配模式无效: {pattern}, 原因: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: BoxedError,
    },

    #[error("匹配结果读取失败: {source}")]
    Unreadable {
        #[source]
        source: BoxedError,
    },

    #[error("模块发现任务失败: {message}")]
    TaskFailed { message: String },
}

/// 加载器顶层错误类型
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("模块发现失败: {source}")]
    Discovery {
        #[from]
        source: DiscoveryError,
    },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("外部模块不存在: {identifier}")]
    ModuleNotFound { identifier: String },

    #[error("无依赖工厂执行失败: {name}, 原因: {source}")]
    Factory {
        name: String,
        #[source]
        source: FactoryError,
    },

    #[error("加载器启动失败: {message}")]
    Bootstrap { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type FactoryResult<T> = Result<T, FactoryError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type LoadResult<T> = Result<T, LoadError>;
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
pub type LoaderResult<T> = Result<T, LoaderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_exposes_path() {
        let error = LoadError::UnknownFactory {
            path: PathBuf::from("modules/a.toml"),
            factory: "server".to_string(),
        };

        assert_eq!(error.path(), &PathBuf::from("modules/a.toml"));
        assert!(error.to_string().contains("server"));
    }

    #[test]
    fn test_factory_error_wraps_boxed_source() {
        let source: BoxedError = "boom".into();
        let error = FactoryError::from(source);

        assert!(matches!(error, FactoryError::Other { .. }));
        assert!(error.to_string().contains("boom"));
    }
}
