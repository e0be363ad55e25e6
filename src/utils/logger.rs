//! 日志系统
//!
//! 提供统一的日志记录功能

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter: quiet dependencies, informative mcphub.
pub const DEFAULT_FILTER: &str = "warn,mcphub=info";

/// Build the filter from an explicit level, else `RUST_LOG`, else the default.
pub fn build_filter(log_level: Option<&str>) -> Result<EnvFilter> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    };
    Ok(filter)
}

/// 初始化日志系统
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// # Examples
/// ```no_run
/// use mcphub::utils::logger::init_logger;
///
/// init_logger(None).unwrap();
/// init_logger(Some("debug")).unwrap();
/// ```
pub fn init_logger(log_level: Option<&str>) -> Result<()> {
    let env_filter = build_filter(log_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!("Logger initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_is_parsed() {
        assert!(build_filter(Some("debug")).is_ok());
        assert!(build_filter(Some("mcphub=trace,warn")).is_ok());
    }

    #[test]
    fn invalid_level_is_rejected() {
        assert!(build_filter(Some("mcphub=notalevel")).is_err());
    }
}
