//! Application configuration file support.
//!
//! Settings are read from an `aog.toml` file:
//!
//! ```toml
//! [repository]
//! type = "local"
//! seed_file = "data/events.json"
//!
//! [analytics]
//! recent_window_days = 30
//! recurring_issue_threshold = 5
//! frequency_ceiling_ratio = 3.0
//! trend_ceiling_ratio = 2.0
//! top_risk_count = 10
//! ```
//!
//! Every key is optional; a missing section takes its defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::{ErrorContext, RepositoryError};
use crate::services::RiskSettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AOG_CONFIG";

/// Application configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
    /// JSON file of events (and optionally aircraft) to preload.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
            seed_file: None,
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

/// Analytics tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: i64,
    #[serde(default = "default_recurring_issue_threshold")]
    pub recurring_issue_threshold: usize,
    #[serde(default = "default_frequency_ceiling_ratio")]
    pub frequency_ceiling_ratio: f64,
    #[serde(default = "default_trend_ceiling_ratio")]
    pub trend_ceiling_ratio: f64,
    /// How many aircraft the fleet risk ranking reports.
    #[serde(default = "default_top_risk_count")]
    pub top_risk_count: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            recent_window_days: default_recent_window_days(),
            recurring_issue_threshold: default_recurring_issue_threshold(),
            frequency_ceiling_ratio: default_frequency_ceiling_ratio(),
            trend_ceiling_ratio: default_trend_ceiling_ratio(),
            top_risk_count: default_top_risk_count(),
        }
    }
}

fn default_recent_window_days() -> i64 {
    30
}

fn default_recurring_issue_threshold() -> usize {
    5
}

/// Upper bound on the recent-frequency window (100 years).
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

fn default_frequency_ceiling_ratio() -> f64 {
    3.0
}

fn default_trend_ceiling_ratio() -> f64 {
    2.0
}

fn default_top_risk_count() -> usize {
    10
}

impl AnalyticsSettings {
    /// Risk-score tunables for [`crate::services::calculate_risk_score`].
    pub fn risk_settings(&self) -> RiskSettings {
        RiskSettings {
            recent_window_days: self.recent_window_days,
            frequency_ceiling_ratio: self.frequency_ceiling_ratio,
            trend_ceiling_ratio: self.trend_ceiling_ratio,
            recurring_issue_threshold: self.recurring_issue_threshold,
        }
    }

    fn validate(&self) -> Result<(), RepositoryError> {
        let problem = if self.recent_window_days <= 0 {
            Some("recent_window_days must be positive")
        } else if self.recent_window_days > MAX_RECENT_WINDOW_DAYS {
            Some("recent_window_days must not exceed 36500")
        } else if self.recurring_issue_threshold < 2 {
            Some("recurring_issue_threshold must be at least 2")
        } else if !(self.frequency_ceiling_ratio.is_finite() && self.frequency_ceiling_ratio > 1.0) {
            Some("frequency_ceiling_ratio must be greater than 1")
        } else if !(self.trend_ceiling_ratio.is_finite() && self.trend_ceiling_ratio > 1.0) {
            Some("trend_ceiling_ratio must be greater than 1")
        } else {
            None
        };

        match problem {
            Some(message) => Err(RepositoryError::ConfigurationError {
                message: message.to_string(),
                context: ErrorContext::new("load_config").with_entity("analytics"),
            }),
            None => Ok(()),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative `seed_file` is resolved against the config file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RepositoryError::ConfigurationError {
            message: format!("Failed to read config file: {}", e),
            context: ErrorContext::new("load_config").with_details(path.display().to_string()),
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if let (Some(seed), Some(dir)) = (config.repository.seed_file.as_ref(), path.parent()) {
            if seed.is_relative() {
                config.repository.seed_file = Some(dir.join(seed));
            }
        }
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        let config: AppConfig = toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.repository_type()?;
        config.analytics.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Uses the file named by `AOG_CONFIG` when set, otherwise searches for
    /// `aog.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(explicit);
        }

        let search_paths = [
            PathBuf::from("aog.toml"),
            PathBuf::from("backend/aog.toml"),
            PathBuf::from("../aog.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No aog.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(|e| {
            RepositoryError::ConfigurationError {
                message: e,
                context: ErrorContext::new("load_config").with_entity("repository"),
            }
        })
    }
}
