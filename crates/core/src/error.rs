//! Error taxonomy
//!
//! Missing lead fields and unseen categories are never errors; they resolve to
//! documented defaults. Everything listed here is fatal and surfaces to the
//! immediate caller with enough context to act on.

use thiserror::Error;

use crate::lead::LeadId;

/// Engine errors
#[derive(Error, Debug)]
pub enum Error {
    /// A feature vector was requested before any vocabulary was fitted
    #[error("Feature encoder has not been fitted; train a conversion model first")]
    UnfittedEncoder,

    /// Training set cannot produce a usable classifier
    #[error(
        "Insufficient training data: {reason} \
         (samples: {samples}, converted: {positives}, not converted: {negatives})"
    )]
    TrainingDataInsufficient {
        reason: String,
        samples: usize,
        positives: usize,
        negatives: usize,
    },

    /// A public-contract parameter is out of range
    #[error("Invalid value for {parameter}: {value} (expected {expected})")]
    InvalidThreshold {
        parameter: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A lead record carries a value outside its field's domain
    #[error("Lead {lead_id}: invalid {field}: {message}")]
    InvalidField {
        lead_id: LeadId,
        field: &'static str,
        message: String,
    },

    /// Feature matrix and label vector disagree in shape
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    FeatureDimension { expected: usize, actual: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Shorthand for an out-of-range parameter
    pub fn invalid_threshold(
        parameter: &'static str,
        value: impl ToString,
        expected: &'static str,
    ) -> Self {
        Error::InvalidThreshold {
            parameter,
            value: value.to_string(),
            expected,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::invalid_threshold("min_score", 120, "0..=100");
        assert_eq!(
            err.to_string(),
            "Invalid value for min_score: 120 (expected 0..=100)"
        );

        let err = Error::InvalidField {
            lead_id: 7,
            field: "timeOnSite",
            message: "must be non-negative, got -3".to_string(),
        };
        assert!(err.to_string().contains("Lead 7"));
        assert!(err.to_string().contains("timeOnSite"));
    }

    #[test]
    fn test_training_error_reports_counts() {
        let err = Error::TrainingDataInsufficient {
            reason: "only one class present".to_string(),
            samples: 10,
            positives: 10,
            negatives: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("samples: 10"));
        assert!(msg.contains("not converted: 0"));
    }
}
