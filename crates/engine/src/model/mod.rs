//! Conversion-probability model
//!
//! A `ConversionModel` bundles the fitted vocabulary with the forest trained
//! on it. `predict_lead` encodes through that vocabulary, so callers that go
//! through the model can never mix vocabularies. `predict_probability` takes
//! an already-encoded vector and trusts its provenance.

mod forest;
mod metrics;
mod split;
mod tree;

pub use forest::RandomForest;
pub use metrics::{roc_auc, AverageMetrics, ClassMetrics, ConfusionMatrix, EvaluationReport};
pub use split::{test_size, train_test_split, TrainTestSplit};
pub use tree::{DecisionTree, Node};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use lead_scoring_config::TrainingConfig;
use lead_scoring_core::{Error, Lead, Result};

use crate::encoder::{FeatureEncoder, FittedEncoder, FEATURE_NAMES, NUM_FEATURES};

/// How much one input column drove the forest's splits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Trained model plus its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: ConversionModel,
    pub evaluation: EvaluationReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionModel {
    encoder: FittedEncoder,
    forest: RandomForest,
    /// Per-feature importance in `FEATURE_NAMES` order
    importances: Vec<f64>,
    trained_at: DateTime<Utc>,
    training: TrainingConfig,
}

impl ConversionModel {
    /// Fit the vocabulary on `leads`, encode, then train and evaluate
    ///
    /// Unlabelled leads are skipped.
    pub fn train(leads: &[Lead], config: &TrainingConfig) -> Result<TrainingOutcome> {
        let labelled: Vec<Lead> = leads.iter().filter(|l| l.is_labelled()).cloned().collect();
        if labelled.len() < leads.len() {
            tracing::debug!(
                skipped = leads.len() - labelled.len(),
                "Skipping leads without a known outcome"
            );
        }

        let encoder = FeatureEncoder::fit(&labelled);
        let features = encoder.transform_batch(&labelled);
        let labels: Vec<bool> = labelled.iter().map(Lead::is_converted).collect();

        Self::train_encoded(encoder, &features, &labels, config)
    }

    /// Train on vectors already encoded with `encoder`
    ///
    /// Holds out `config.test_fraction` of the rows (seeded), grows the forest
    /// on the rest and evaluates on the held-out rows. Fails before building
    /// anything when the data cannot produce a two-class model.
    pub fn train_encoded(
        encoder: FittedEncoder,
        features: &[Vec<f64>],
        labels: &[bool],
        config: &TrainingConfig,
    ) -> Result<TrainingOutcome> {
        validate_config(config)?;

        if features.len() != labels.len() {
            return Err(Error::FeatureDimension {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        if let Some(row) = features.iter().find(|row| row.len() != NUM_FEATURES) {
            return Err(Error::FeatureDimension {
                expected: NUM_FEATURES,
                actual: row.len(),
            });
        }

        let samples = labels.len();
        let positives = labels.iter().filter(|&&l| l).count();
        let negatives = samples - positives;
        let insufficient = |reason: &str| Error::TrainingDataInsufficient {
            reason: reason.to_string(),
            samples,
            positives,
            negatives,
        };

        if samples < 2 {
            return Err(insufficient("need at least two labelled leads"));
        }
        if positives == 0 || negatives == 0 {
            return Err(insufficient("only one outcome class present"));
        }

        let split = train_test_split(samples, config.test_fraction, config.seed);
        let train_x: Vec<Vec<f64>> = split.train.iter().map(|&i| features[i].clone()).collect();
        let train_y: Vec<bool> = split.train.iter().map(|&i| labels[i]).collect();

        let train_positives = train_y.iter().filter(|&&l| l).count();
        if train_positives == 0 || train_positives == train_y.len() {
            return Err(insufficient("training partition holds only one outcome class"));
        }

        tracing::debug!(
            train = split.train.len(),
            test = split.test.len(),
            seed = config.seed,
            "Split labelled leads"
        );

        let (forest, importances) = RandomForest::fit(&train_x, &train_y, NUM_FEATURES, config);

        let model = ConversionModel {
            encoder,
            forest,
            importances,
            trained_at: Utc::now(),
            training: config.clone(),
        };

        let test_y: Vec<bool> = split.test.iter().map(|&i| labels[i]).collect();
        let test_p: Vec<f64> = split
            .test
            .iter()
            .map(|&i| model.predict_probability(&features[i]))
            .collect();
        let evaluation = EvaluationReport::evaluate(
            &test_y,
            &test_p,
            config.decision_threshold,
            split.train.len(),
        );

        match evaluation.roc_auc {
            Some(auc) => tracing::info!(
                samples,
                converted = positives,
                trees = config.n_trees,
                accuracy = evaluation.accuracy,
                auc,
                "Conversion model trained"
            ),
            None => tracing::warn!(
                samples,
                test = split.test.len(),
                "Held-out leads contain a single outcome class; ROC AUC undefined"
            ),
        }

        Ok(TrainingOutcome { model, evaluation })
    }

    /// Conversion probability for a vector encoded with this model's vocabulary
    pub fn predict_probability(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), NUM_FEATURES);
        self.forest.predict_probability(features)
    }

    /// Encode with the fitted vocabulary, then predict
    pub fn predict_lead(&self, lead: &Lead) -> f64 {
        self.predict_probability(&self.encoder.transform(lead))
    }

    /// Whether `predict_lead` clears the configured decision threshold
    pub fn predicts_conversion(&self, lead: &Lead) -> bool {
        self.predict_lead(lead) >= self.training.decision_threshold
    }

    /// Importances sorted descending; ties keep feature order
    pub fn feature_importance(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = FEATURE_NAMES
            .iter()
            .zip(&self.importances)
            .map(|(name, &importance)| FeatureImportance {
                feature: (*name).to_string(),
                importance,
            })
            .collect();
        // Stable sort keeps ties in feature order
        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked
    }

    pub fn encoder(&self) -> &FittedEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.training
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a model artifact, rejecting structurally broken forests
    pub fn from_json(json: &str) -> Result<Self> {
        let model: ConversionModel = serde_json::from_str(json)?;
        if model.forest.n_features() != NUM_FEATURES
            || model.importances.len() != NUM_FEATURES
            || !model.forest.is_well_formed()
        {
            return Err(Error::Serialization(
                "model artifact does not match the lead feature layout".to_string(),
            ));
        }
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        tracing::info!(path = %path.as_ref().display(), "Saved conversion model");
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let model = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            trees = model.forest.n_trees(),
            trained_at = %model.trained_at,
            "Loaded conversion model"
        );
        Ok(model)
    }
}

/// Reject out-of-range training parameters at the public boundary
fn validate_config(config: &TrainingConfig) -> Result<()> {
    match config.first_violation() {
        Some(violation) => Err(Error::InvalidThreshold {
            parameter: violation.parameter,
            value: violation.value,
            expected: violation.expected,
        }),
        None => Ok(()),
    }
}
