//! Logging setup.
//!
//! Human-readable output goes to stderr, filtered by `RUST_LOG` (default
//! `info`). Warnings and errors are also appended to `error.log` next to the
//! configuration file so failed runs leave a trace.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::CliError;

/// Name of the persistent error log.
pub const ERROR_LOG: &str = "error.log";

/// Location of the error log for a configuration file at `config_path`.
pub fn error_log_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join(ERROR_LOG))
        .unwrap_or_else(|| PathBuf::from(ERROR_LOG))
}

/// Install the global subscriber.
///
/// The returned guard flushes the error log on drop and must be held for
/// the life of the process.
pub fn init(config_path: &Path, verbose: bool) -> Result<WorkerGuard, CliError> {
    let log_path = error_log_path(config_path);
    let log_dir = log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        CliError::Logging(format!("cannot create {}: {}", log_dir.display(), e))
    })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, ERROR_LOG);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(guard)
}
