//! Conversion model training parameters

use serde::{Deserialize, Serialize};

use crate::constants::training as defaults;
use crate::ConfigError;

/// Number of candidate features examined at each tree split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    #[default]
    Sqrt,
    /// `ceil(log2(n_features))`
    Log2,
    /// Every feature
    All,
    /// A fixed count, capped at the number of features
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features` columns (at least 1)
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let k = match self {
            MaxFeatures::Sqrt => (n as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n as f64).log2().ceil() as usize,
            MaxFeatures::All => n,
            MaxFeatures::Fixed(k) => *k,
        };
        k.clamp(1, n)
    }
}

/// Hold-out split and forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of labelled leads held out for evaluation, in (0, 1)
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Seed for the split and for every tree; same seed and input order
    /// reproduce the same model
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    /// Unlimited when absent
    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,

    #[serde(default)]
    pub max_features: MaxFeatures,

    /// Train each tree on a bootstrap resample
    #[serde(default = "default_true")]
    pub bootstrap: bool,

    /// Probability at or above which a lead is predicted to convert
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,
}

fn default_test_fraction() -> f64 {
    defaults::TEST_FRACTION
}

fn default_seed() -> u64 {
    defaults::SEED
}

fn default_n_trees() -> usize {
    defaults::N_TREES
}

fn default_min_samples_split() -> usize {
    defaults::MIN_SAMPLES_SPLIT
}

fn default_min_samples_leaf() -> usize {
    defaults::MIN_SAMPLES_LEAF
}

fn default_true() -> bool {
    true
}

fn default_decision_threshold() -> f64 {
    defaults::DECISION_THRESHOLD
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            n_trees: default_n_trees(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: MaxFeatures::default(),
            bootstrap: true,
            decision_threshold: default_decision_threshold(),
        }
    }
}

/// A training parameter outside its allowed range
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterViolation {
    pub parameter: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParameterViolation {
    fn new(parameter: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self {
            parameter,
            value: value.to_string(),
            expected,
        }
    }
}

impl TrainingConfig {
    /// First parameter outside its range, checked in declaration order
    pub fn first_violation(&self) -> Option<ParameterViolation> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Some(ParameterViolation::new(
                "test_fraction",
                self.test_fraction,
                "a value strictly between 0 and 1",
            ));
        }
        if self.n_trees == 0 {
            return Some(ParameterViolation::new("n_trees", 0, "at least 1"));
        }
        if self.max_depth == Some(0) {
            return Some(ParameterViolation::new("max_depth", 0, "at least 1 when set"));
        }
        if self.min_samples_split < 2 {
            return Some(ParameterViolation::new(
                "min_samples_split",
                self.min_samples_split,
                "at least 2",
            ));
        }
        if self.min_samples_leaf == 0 {
            return Some(ParameterViolation::new("min_samples_leaf", 0, "at least 1"));
        }
        if self.max_features == MaxFeatures::Fixed(0) {
            return Some(ParameterViolation::new("max_features", 0, "at least 1"));
        }
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            return Some(ParameterViolation::new(
                "decision_threshold",
                self.decision_threshold,
                "a value between 0 and 1",
            ));
        }
        None
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.first_violation() {
            Some(v) => Err(ConfigError::invalid(
                format!("training.{}", v.parameter),
                format!("Must be {}, got {}", v.expected, v.value),
            )),
            None => Ok(()),
        }
    }
}
