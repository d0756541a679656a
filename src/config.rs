//! User settings, stored as JSON in the platform config directory.

use crate::analyser::logic::validation::StrictOptions;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "PREPKIT_CONFIG";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Also write rotating log files under the data directory
    pub log_to_file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            log_to_file: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Options for the strict upload validator
    pub strict: StrictOptions,
    /// Maximum snapshots kept for undo; `None` keeps all of them
    pub history_limit: Option<usize>,
    /// Rows shown by table previews (default: 20)
    pub preview_row_limit: usize,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: StrictOptions::default(),
            history_limit: None,
            preview_row_limit: 20,
            logging: LoggingSettings::default(),
        }
    }
}

/// Settings file location: `$PREPKIT_CONFIG`, else
/// `<config dir>/prepkit/settings.json`.
///
/// # Errors
///
/// Fails when the platform has no config directory.
pub fn settings_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(base.join("prepkit").join("settings.json"))
}

/// Settings with the reason defaults were used instead of a file, if any.
pub type LoadedSettings = (Settings, Option<anyhow::Error>);

/// Loads settings from [`settings_path`], falling back to defaults when the
/// file is absent or bad.
///
/// Runs before logging is set up, so the fallback reason is returned for the
/// caller to report once a subscriber exists.
pub fn load_settings() -> LoadedSettings {
    match settings_path() {
        Ok(path) => load_settings_or_default(&path),
        Err(e) => (Settings::default(), Some(e)),
    }
}

/// Loads settings from `path`; an absent file silently yields defaults, an
/// unreadable or malformed one yields defaults plus the error.
pub fn load_settings_or_default(path: &Path) -> LoadedSettings {
    if !path.exists() {
        return (Settings::default(), None);
    }
    match load_settings_from(path) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    }
}

/// Loads settings from `path`; missing fields take their defaults.
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid settings JSON.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings file {}", path.display()))
}

/// Writes `settings` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Fails on serialization or filesystem errors.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}
