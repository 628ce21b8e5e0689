//! Server Configuration
//!
//! Defaults, then an optional `churn-predictor.toml`, then `CHURN__*`
//! environment variables.

use data_validator::ValidationConfig;
use feature_engine::UnknownLevelPolicy;
use inference_engine::DEFAULT_ARTIFACT_PATH;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "churn-predictor";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// Model artifact location
    pub artifact_path: PathBuf,
    /// Handling of categorical levels outside the trained enumeration
    pub unknown_level_policy: UnknownLevelPolicy,
    /// Maximum log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Form range limits
    pub validation: ValidationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            unknown_level_policy: UnknownLevelPolicy::Reject,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            validation: ValidationConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the conventional file and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load from `file` (extension optional, may be absent) and the environment
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("CHURN").separator("__"))
            .build()?
            .try_deserialize()
    }
}
