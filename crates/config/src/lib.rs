//! Configuration for the lead scoring engine
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files (`config/default.*`, `config/{env}.*`)
//! - Environment variables (LEAD_SCORING__ prefix)
//! - Built-in defaults assembled from the named weight tables in `constants`
//!
//! Sections:
//! - `ScoringConfig` - rule weight tables and threshold ladders
//! - `TrainingConfig` - hold-out split and forest hyper-parameters
//! - `RankingConfig` - shortlist filters
//! - `ObservabilityConfig` - log level and format

pub mod constants;
pub mod scoring;
pub mod settings;
pub mod training;

pub use scoring::{
    CategoryWeight, LookupWeights, QualityWeights, ScoringConfig, ThresholdLadder, ThresholdStep,
};
pub use settings::{load_settings, ObservabilityConfig, RankingConfig, Settings};
pub use training::{MaxFeatures, ParameterViolation, TrainingConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::MissingField(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
