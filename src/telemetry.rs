//! 日志初始化
//! 按配置选择输出格式，默认屏蔽依赖库的低级别日志

use crate::config::LoggingConfig;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
    EnvFilter, Layer,
};

/// 依赖库只保留告警以上日志，避免连接细节刷屏
const DEPENDENCY_DIRECTIVES: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "h2=warn"];

/// 构建日志过滤器
/// `RUST_LOG` 优先，否则使用配置的级别
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec![level.to_lowercase()];
        directives.extend(DEPENDENCY_DIRECTIVES.iter().map(|d| d.to_string()));
        EnvFilter::new(directives.join(","))
    })
}

/// 初始化全局日志订阅器
///
/// - `json`: 每行一个 JSON 对象，记录 span 关闭事件（生产环境）
/// - `pretty`: 多行彩色输出（开发环境）
/// - `compact`: 单行文本
///
/// 重复初始化返回错误
pub fn init_telemetry(logging: &LoggingConfig) -> Result<(), TryInitError> {
    let log_layer = match logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        "pretty" => tracing_subscriber::fmt::layer().pretty().boxed(),
        _ => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(build_filter(&logging.level))
        .with(log_layer)
        .try_init()?;

    tracing::info!(
        level = %logging.level,
        format = %logging.format,
        "Logging initialized"
    );

    Ok(())
}
