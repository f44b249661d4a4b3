//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/daybook/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/daybook/` (~/.config/daybook/)
//! - Data: `$XDG_DATA_HOME/daybook/` (~/.local/share/daybook/)
//! - State/Logs: `$XDG_STATE_HOME/daybook/` (~/.local/state/daybook/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

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
    /// Analytics configuration
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analytics windows and pattern-discovery thresholds.
///
/// Defaults match the product behavior; all values are overridable from
/// config.toml for experimentation.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Days of history a summary/consistency window covers
    #[serde(default = "default_summary_window_days")]
    pub summary_window_days: u32,

    /// Days of history the weekday ranking covers
    #[serde(default = "default_weekday_window_days")]
    pub weekday_window_days: u32,

    /// Days of history the activity heatmap covers
    #[serde(default = "default_heatmap_window_days")]
    pub heatmap_window_days: u32,

    /// Minimum days a value bucket needs before it can anchor a pattern
    #[serde(default = "default_min_bucket_days")]
    pub min_bucket_days: usize,

    /// Boolean outcome true-rate at or above which it qualifies as "included"
    #[serde(default = "default_bool_include_rate")]
    pub bool_include_rate: f64,

    /// Boolean outcome true-rate at or below which it qualifies as "not included"
    #[serde(default = "default_bool_exclude_rate")]
    pub bool_exclude_rate: f64,

    /// Minimum share a text value needs to be listed as a bucket outcome
    #[serde(default = "default_text_min_share")]
    pub text_min_share: f64,

    /// Event-set overlap above which two patterns are considered duplicates
    #[serde(default = "default_dedup_overlap")]
    pub dedup_overlap: f64,
}

fn default_summary_window_days() -> u32 {
    30
}

fn default_weekday_window_days() -> u32 {
    30
}

fn default_heatmap_window_days() -> u32 {
    84
}

fn default_min_bucket_days() -> usize {
    2
}

fn default_bool_include_rate() -> f64 {
    0.70
}

fn default_bool_exclude_rate() -> f64 {
    0.30
}

fn default_text_min_share() -> f64 {
    0.15
}

fn default_dedup_overlap() -> f64 {
    0.70
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            summary_window_days: default_summary_window_days(),
            weekday_window_days: default_weekday_window_days(),
            heatmap_window_days: default_heatmap_window_days(),
            min_bucket_days: default_min_bucket_days(),
            bool_include_rate: default_bool_include_rate(),
            bool_exclude_rate: default_bool_exclude_rate(),
            text_min_share: default_text_min_share(),
            dedup_overlap: default_dedup_overlap(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "daybook_core=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Path to the config file.
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("daybook").join("config.toml")
    }

    /// Directory for application data (database).
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("daybook")
    }

    /// Path to the SQLite database.
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("daybook.db")
    }

    /// Directory for logs and other mutable state.
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("daybook")
    }

    /// Path to the log file.
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("daybook.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analytics.summary_window_days, 30);
        assert_eq!(config.analytics.heatmap_window_days, 84);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [analytics]
            heatmap_window_days = 28

            [logging]
            level = "debug"
            "#,
        )
        .expect("parse config");

        assert_eq!(config.analytics.heatmap_window_days, 28);
        // Unspecified fields keep their defaults
        assert_eq!(config.analytics.weekday_window_days, 30);
        assert_eq!(config.analytics.dedup_overlap, 0.70);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_paths_are_project_scoped() {
        assert!(Config::database_path().ends_with("daybook/daybook.db"));
        assert!(Config::log_path().ends_with("daybook/daybook.log"));
    }
}
