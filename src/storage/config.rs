//! Analytics configuration.
//!
//! Settings are stored as TOML in the platform data directory. The engine
//! only ever sees an immutable snapshot; changes are applied by handing it a
//! new one.

use crate::equipment::BikeCatalog;
use crate::metrics::pull_draft::PullDraftSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Full analytics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Configuration version
    pub version: String,
    /// Selected bike name
    pub bike: String,
    /// CdA estimation settings
    pub cda: CdaSettings,
    /// Gradient estimation settings
    pub gradient: GradientSettings,
    /// Pull/draft tracking settings
    pub pull_draft: PullDraftSettings,
    /// Display preferences
    pub display: DisplaySettings,
    /// Parameter log settings
    pub log: LogSettings,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            bike: BikeCatalog::builtin().default_bike().name.clone(),
            cda: CdaSettings::default(),
            gradient: GradientSettings::default(),
            pull_draft: PullDraftSettings::default(),
            display: DisplaySettings::default(),
            log: LogSettings::default(),
        }
    }
}

/// CdA estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdaSettings {
    /// Smoothing window in milliseconds
    pub average_window_ms: u64,
    /// Number of raw values retained for smoothing
    pub history_length: usize,
    /// Added to the catalog bike weight (bottles, computer, ...)
    pub extra_bike_weight_kg: f64,
}

impl Default for CdaSettings {
    fn default() -> Self {
        Self {
            average_window_ms: 3000,
            history_length: 200,
            extra_bike_weight_kg: 0.2,
        }
    }
}

impl CdaSettings {
    /// Smoothing window as a duration.
    pub fn average_window(&self) -> Duration {
        Duration::from_millis(self.average_window_ms)
    }
}

/// Gradient estimation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientSettings {
    /// Smoothing window in milliseconds
    pub average_window_ms: u64,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            average_window_ms: 500,
        }
    }
}

impl GradientSettings {
    /// Smoothing window as a duration.
    pub fn average_window(&self) -> Duration {
        Duration::from_millis(self.average_window_ms)
    }
}

/// Display preferences passed through to the rendering side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Show session totals for pulling and drafting
    pub show_accumulated_statistics: bool,
    /// Show average power as W/kg
    pub show_wkg: bool,
    /// Hide unit suffixes
    pub hide_unit: bool,
}

/// In-memory parameter log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Record a parameter row for every tick
    pub enabled: bool,
    /// Maximum rows kept; older rows are dropped
    pub max_rows: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_rows: 3000,
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "aerowatch", "AeroWatch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AnalyticsConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`, returning defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<AnalyticsConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AnalyticsConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save configuration to the default location.
pub fn save_config(config: &AnalyticsConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to `path`, creating parent directories as needed.
pub fn save_config_to(config: &AnalyticsConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
