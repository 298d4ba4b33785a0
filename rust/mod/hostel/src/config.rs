use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Application configuration.
///
/// Every field has a default, so an empty TOML file is a valid config:
///
/// ```toml
/// db_path = "/var/lib/hostel/hostel.redb"
/// login_delay_ms = 1000
/// submit_delay_ms = 1000
/// review_delay_ms = 1000
/// default_hostel_id = "h1"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostelConfig {
    /// Path to the redb file backing `user` and `complaints`.
    pub db_path: PathBuf,
    /// Artificial latency of a login attempt.
    pub login_delay_ms: u64,
    /// Artificial latency of a complaint submission.
    pub submit_delay_ms: u64,
    /// Artificial latency of a rector review.
    pub review_delay_ms: u64,
    /// Hostel assigned to complaints from identities without one.
    pub default_hostel_id: String,
}

impl Default for HostelConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("hostel.redb"),
            login_delay_ms: 1000,
            submit_delay_ms: 1000,
            review_delay_ms: 1000,
            default_hostel_id: "h1".to_string(),
        }
    }
}

impl HostelConfig {
    /// Defaults with every artificial delay set to zero.
    pub fn headless() -> Self {
        Self {
            login_delay_ms: 0,
            submit_delay_ms: 0,
            review_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Load a TOML config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    pub fn review_delay(&self) -> Duration {
        Duration::from_millis(self.review_delay_ms)
    }
}
