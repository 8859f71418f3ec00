//! Logging setup for backup runs
//!
//! `run` logs to two places:
//! - stderr, INFO and above, without targets
//! - `<log_directory>/cloud-backup.log.<date>`, at the configured level, one file per day
//!
//! Only the newest `log_max_files` log files are kept.

use crate::config::{expand_tilde, GlobalConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Log file name; the rolling appender appends the date
const LOG_FILE_PREFIX: &str = "cloud-backup.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_directory: PathBuf,
    /// Level of the file log; the console stays at INFO
    pub log_level: Level,
    pub max_files: u32,
}

impl LoggingConfig {
    /// Unknown level names fall back to INFO
    pub fn from_config(global: &GlobalConfig) -> Self {
        Self {
            log_directory: expand_tilde(&global.log_directory),
            log_level: global.log_level.parse().unwrap_or(Level::INFO),
            max_files: global.log_max_files,
        }
    }
}

/// Install the console and file layers as the global subscriber.
///
/// Keep the returned guard alive until exit; dropping it flushes the file log.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    fs::create_dir_all(&config.log_directory)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_directory))?;

    let appender = RollingFileAppender::new(Rotation::DAILY, &config.log_directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(level_filter(config.log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level_filter(Level::INFO));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    prune_logs(&config.log_directory, config.max_files)?;

    Ok(LogGuard { _guard: guard })
}

/// Console-only logging for commands that never run a backup
pub fn init_console_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `RUST_LOG` wins over the configured level
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cloud_backup={},{}", level, level)))
}

/// Delete all but the newest `keep` log files.
/// Rotated files end in `YYYY-MM-DD`, so reverse name order is newest first.
fn prune_logs(log_dir: &Path, keep: u32) -> Result<()> {
    let mut logs: Vec<PathBuf> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX))
        .map(|entry| entry.path())
        .collect();

    logs.sort_unstable_by(|a, b| b.cmp(a));

    for path in logs.iter().skip(keep as usize) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to remove old log file {:?}: {}", path, e);
        }
    }

    Ok(())
}

/// Flushes the file log when dropped
pub struct LogGuard {
    _guard: WorkerGuard,
}
