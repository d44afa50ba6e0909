//! 约定规范定义
//!
//! 模块注册名与依赖候选名的命名约定

/// 模块名称中的分段分隔符
pub const SEGMENT_SEPARATOR: char = '_';

/// 注册名中的层级分隔符
pub const NAME_SEPARATOR: &str = ".";

/// 模块发现时固定排除的目录（版本控制与依赖目录）
pub const EXCLUDED_DIRECTORIES: &[&str] = &[".git", "node_modules", "target"];

/// 命名约定规范
#[derive(Debug)]
pub struct NamingConventions;

impl NamingConventions {
    /// 规范化命名空间，空字符串视为未设置
    pub fn normalize_namespace(namespace: Option<&str>) -> Option<&str> {
        namespace.filter(|ns| !ns.is_empty())
    }

    /// 生成模块的注册名
    ///
    /// 模块名按下划线拆分为多个分段，与命名空间一起以 `.` 连接。
    /// `registration_name(Some("app"), "http_server")` 得到 `app.http.server`。
    pub fn registration_name(namespace: Option<&str>, module_name: &str) -> String {
        let segments = module_name.split(SEGMENT_SEPARATOR);

        match Self::normalize_namespace(namespace) {
            Some(ns) => std::iter::once(ns)
                .chain(segments)
                .collect::<Vec<_>>()
                .join(NAME_SEPARATOR),
            None => segments.collect::<Vec<_>>().join(NAME_SEPARATOR),
        }
    }

    /// 生成依赖参数的限定名：`注册名.参数名`
    pub fn qualified_name(namespace: Option<&str>, module_name: &str, argument: &str) -> String {
        format!(
            "{}{}{}",
            Self::registration_name(namespace, module_name),
            NAME_SEPARATOR,
            argument
        )
    }

    /// 生成依赖参数的命名空间名：`命名空间.参数名`
    ///
    /// 未设置命名空间时没有该候选名
    pub fn namespace_name(namespace: Option<&str>, argument: &str) -> Option<String> {
        Self::normalize_namespace(namespace).map(|ns| format!("{}{}{}", ns, NAME_SEPARATOR, argument))
    }

    /// 上下文作用域中的名称：`上下文.名称`
    pub fn scoped_name(context: &str, name: &str) -> String {
        format!("{}{}{}", context, NAME_SEPARATOR, name)
    }
}
