//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/habitual/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/habitual/` (~/.config/habitual/)
//! - Data: `$XDG_DATA_HOME/habitual/` (~/.local/share/habitual/)
//! - State/Logs: `$XDG_STATE_HOME/habitual/` (~/.local/state/habitual/)

use crate::analytics::heatmap::{DEFAULT_HEATMAP_DAYS, MAX_HEATMAP_DAYS};
use crate::analytics::RateWindow;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Analytics defaults
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analytics configuration
#[derive(Debug, Deserialize)]
pub struct AnalyticsConfig {
    /// Default completion-rate window ("7d", "30d", "90d", "1y")
    #[serde(default)]
    pub rate_window: RateWindow,

    /// Default trailing heatmap length in days
    #[serde(default = "default_heatmap_days")]
    pub heatmap_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            rate_window: RateWindow::default(),
            heatmap_days: default_heatmap_days(),
        }
    }
}

fn default_heatmap_days() -> u32 {
    DEFAULT_HEATMAP_DAYS
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.analytics.heatmap_days == 0 || self.analytics.heatmap_days > MAX_HEATMAP_DAYS {
            return Err(Error::Config(format!(
                "analytics.heatmap_days must be between 1 and {}",
                MAX_HEATMAP_DAYS
            )));
        }
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/habitual/config.toml` (~/.config/habitual/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("habitual").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/habitual/` (~/.local/share/habitual/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("habitual")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/habitual/` (~/.local/state/habitual/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("habitual")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/habitual/habits.db` (~/.local/share/habitual/habits.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("habits.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/habitual/habitual.log` (~/.local/state/habitual/habitual.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("habitual.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// Called by the CLI before anything resolves a path.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
