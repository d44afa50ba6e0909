//! 模块加载器测试


use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
pub(crate) fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}
