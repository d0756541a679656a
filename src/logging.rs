//! Logging setup for the `prepkit` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the host. [`init`] installs a console layer and, when enabled in
//! [`LoggingSettings`], two daily-rotating files in the data directory:
//!
//! - `prepkit.<date>.log`: everything that passes the filter
//! - `error.<date>.log`: warnings and errors only
//!
//! `RUST_LOG` overrides the configured level.

use crate::config::LoggingSettings;
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Log directory under the platform data dir, created on demand.
///
/// - Windows: `%APPDATA%/prepkit/logs`
/// - macOS: `~/Library/Application Support/prepkit/logs`
/// - Linux: `~/.local/share/prepkit/logs`
///
/// # Errors
///
/// Fails when there is no data directory or it cannot be created.
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("prepkit").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn file_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} file appender"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the filter is invalid or the log files cannot be
/// created.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Failed to create env filter")?;

    // Logs go to stderr so stdout stays clean for command output.
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let (all_logs_layer, error_logs_layer) = if settings.log_to_file {
        let log_dir = get_log_dir()?;
        let all_logs = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(file_appender(&log_dir, "prepkit")?);
        let error_logs = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(file_appender(&log_dir, "error")?)
            .with_filter(EnvFilter::new("warn"));
        (Some(all_logs), Some(error_logs))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(level = %settings.level, to_file = settings.log_to_file, "Logging initialized");
    Ok(())
}
