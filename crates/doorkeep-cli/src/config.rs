//! Configuration file
//!
//! ```toml
//! data_path = "doorkeep.json"
//! log_level = "info"
//! sanitize_every = 100
//! password_iterations = 210000
//! ```
//!
//! Every key is optional. A missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// File is not valid TOML for this schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying TOML error
        source: toml::de::Error,
    },
    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorkeepConfig {
    /// JSON snapshot holding the store
    pub data_path: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Run the state sanitation hook once per this many state queries
    pub sanitize_every: u64,
    /// PBKDF2 iteration count for new password hashes
    pub password_iterations: u32,
}

impl Default for DoorkeepConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("doorkeep.json"),
            log_level: "info".to_string(),
            sanitize_every: doorkeep_effects::sanitation::DEFAULT_MODULUS,
            password_iterations: doorkeep_effects::hashing::DEFAULT_ITERATIONS,
        }
    }
}

impl DoorkeepConfig {
    /// Load from `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sanitize_every == 0 {
            return Err(ConfigError::Invalid("sanitize_every must be positive"));
        }
        if self.password_iterations == 0 {
            return Err(ConfigError::Invalid("password_iterations must be positive"));
        }
        Ok(())
    }
}
