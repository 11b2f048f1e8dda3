//! Logging setup.
//!
//! Stdout belongs to the REPL, so all tracing output goes to a daily-rolling
//! file under the logs directory.

use anyhow::{Context, Result};
use gemma_core::config::DEFAULT_LOG_LEVEL;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "GEMMA_LOG";

/// File name prefix; the appender adds `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "gemma.log";

/// Picks the filter directive: `GEMMA_LOG`, then `RUST_LOG`, then the configured level.
pub fn resolve_filter(
    gemma_log: Option<String>,
    rust_log: Option<String>,
    configured: &str,
) -> String {
    gemma_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| configured.to_string())
}

/// Installs the global subscriber writing to `logs_dir`.
///
/// The returned guard flushes buffered lines on drop and must live until exit.
pub fn init_logging(logs_dir: &Path, configured_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let directive = resolve_filter(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
        configured_level,
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemma_log_wins() {
        assert_eq!(
            resolve_filter(Some("debug".into()), Some("warn".into()), "info"),
            "debug"
        );
    }

    #[test]
    fn test_rust_log_is_second() {
        assert_eq!(resolve_filter(None, Some("warn".into()), "info"), "warn");
        assert_eq!(resolve_filter(Some(" ".into()), Some("warn".into()), "info"), "warn");
    }

    #[test]
    fn test_configured_level_is_fallback() {
        assert_eq!(resolve_filter(None, None, "trace"), "trace");
    }
}
