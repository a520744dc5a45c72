use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LOG_DIR_NAME, LOG_FILE_PREFIX};

/// Send `tracing` output to a daily log file under `data_dir`. The terminal is
/// owned by the TUI, so nothing is written to stdout. Keep the returned guard
/// alive until exit so buffered lines are flushed.
pub fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    let log_dir = data_dir.join(LOG_DIR_NAME);
    fs::create_dir_all(&log_dir).context("failed to create log directory")?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    Ok(guard)
}
