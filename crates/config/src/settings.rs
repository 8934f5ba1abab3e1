//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::ranking as defaults;
use crate::{ConfigError, ScoringConfig, TrainingConfig};

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Rule weight tables
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Conversion model training
    #[serde(default)]
    pub training: TrainingConfig,

    /// Shortlist filters
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.training.validate()?;
        self.ranking.validate()?;
        Ok(())
    }
}

/// Shortlist filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Leads scoring below this are dropped, in [0, 100]
    #[serde(default = "default_min_score")]
    pub min_score: u32,

    /// Drop leads that already converted
    #[serde(default = "default_true")]
    pub exclude_converted: bool,

    /// How many shortlisted leads callers surface by default
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Sources with fewer leads are left out of the conversion-by-source table
    #[serde(default = "default_min_leads_per_source")]
    pub min_leads_per_source: usize,
}

fn default_min_score() -> u32 {
    defaults::MIN_SCORE
}

fn default_true() -> bool {
    true
}

fn default_top_n() -> usize {
    defaults::TOP_N
}

fn default_min_leads_per_source() -> usize {
    defaults::MIN_LEADS_PER_SOURCE
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            exclude_converted: true,
            top_n: default_top_n(),
            min_leads_per_source: default_min_leads_per_source(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_score > 100 {
            return Err(ConfigError::invalid(
                "ranking.min_score",
                format!("Must be between 0 and 100, got {}", self.min_score),
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from `{config_dir}/default.*`, `{config_dir}/{env}.*` and
/// `LEAD_SCORING__*` environment variables, in increasing priority.
///
/// Missing files are fine; built-in defaults fill every gap.
pub fn load_settings(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder = builder.add_source(File::from(config_dir.join(env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("LEAD_SCORING")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        config_dir = %config_dir.display(),
        env = env.unwrap_or("default"),
        "Settings loaded"
    );

    Ok(settings)
}
