//! Categorical-to-numeric feature encoding
//!
//! `FeatureEncoder::fit` returns an immutable `FittedEncoder`; every transform
//! goes through that value, so training and inference share one vocabulary by
//! construction. Categories are numbered from 1 in lexicographic order and
//! code 0 is reserved for absent or unseen values.

use serde::{Deserialize, Serialize};

use lead_scoring_core::Lead;

/// Column order of every encoded vector
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "total_visits",
    "time_on_site",
    "page_views_per_visit",
    "source",
    "last_activity",
    "lead_quality",
    "origin",
];

pub const NUM_FEATURES: usize = 7;

/// Code for absent values and categories not seen during `fit`
pub const UNKNOWN_CODE: f64 = 0.0;

/// Builds vocabularies from training leads
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Scan the leads once per categorical column and fix the vocabulary
    ///
    /// Deterministic: the same input (in any order) yields the same codes.
    pub fn fit(leads: &[Lead]) -> FittedEncoder {
        let encoder = FittedEncoder {
            source: Vocabulary::collect(leads.iter().filter_map(Lead::source)),
            last_activity: Vocabulary::collect(leads.iter().filter_map(Lead::last_activity)),
            lead_quality: Vocabulary::collect(
                leads
                    .iter()
                    .filter_map(|lead| lead.lead_quality.map(|q| q.as_str())),
            ),
            origin: Vocabulary::collect(leads.iter().filter_map(Lead::origin)),
        };

        tracing::debug!(
            leads = leads.len(),
            sources = encoder.source.len(),
            activities = encoder.last_activity.len(),
            origins = encoder.origin.len(),
            "Fitted feature vocabulary"
        );

        encoder
    }
}

/// Sorted category list; a category's code is its position plus one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    categories: Vec<String>,
}

impl Vocabulary {
    fn collect<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        Self::from(values.map(str::to_string).collect::<Vec<_>>())
    }

    /// Code for a category, `UNKNOWN_CODE` when absent or unseen
    pub fn code(&self, category: Option<&str>) -> f64 {
        category
            .and_then(|c| {
                self.categories
                    .binary_search_by(|probe| probe.as_str().cmp(c))
                    .ok()
            })
            .map(|index| (index + 1) as f64)
            .unwrap_or(UNKNOWN_CODE)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(mut categories: Vec<String>) -> Self {
        categories.sort();
        categories.dedup();
        Self { categories }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.categories
    }
}

/// Fitted vocabularies for the four categorical columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedEncoder {
    pub source: Vocabulary,
    pub last_activity: Vocabulary,
    pub lead_quality: Vocabulary,
    pub origin: Vocabulary,
}

impl FittedEncoder {
    /// Encode one lead in `FEATURE_NAMES` order
    pub fn transform(&self, lead: &Lead) -> Vec<f64> {
        vec![
            f64::from(lead.visits()),
            lead.time_on_site_secs(),
            lead.page_views(),
            self.source.code(lead.source()),
            self.last_activity.code(lead.last_activity()),
            self.lead_quality
                .code(lead.lead_quality.as_ref().map(|q| q.as_str())),
            self.origin.code(lead.origin()),
        ]
    }

    pub fn transform_batch(&self, leads: &[Lead]) -> Vec<Vec<f64>> {
        leads.iter().map(|lead| self.transform(lead)).collect()
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_scoring_core::LeadQuality;

    fn training_leads() -> Vec<Lead> {
        vec![
            Lead::new(1)
                .with_source("Google")
                .with_last_activity("SMS Sent")
                .with_quality(LeadQuality::High)
                .with_origin("API")
                .with_total_visits(4)
                .with_time_on_site(300.0)
                .with_page_views_per_visit(2.5),
            Lead::new(2)
                .with_source("Direct Traffic")
                .with_last_activity("Email Opened")
                .with_quality(LeadQuality::Low),
            Lead::new(3).with_source("Google"),
        ]
    }

    #[test]
    fn test_codes_follow_sorted_order() {
        let encoder = FeatureEncoder::fit(&training_leads());
        assert_eq!(encoder.source.categories(), ["Direct Traffic", "Google"]);
        assert_eq!(encoder.source.code(Some("Direct Traffic")), 1.0);
        assert_eq!(encoder.source.code(Some("Google")), 2.0);
        assert_eq!(encoder.lead_quality.categories(), ["High", "Low"]);
    }

    #[test]
    fn test_transform_layout() {
        let leads = training_leads();
        let encoder = FeatureEncoder::fit(&leads);
        let vector = encoder.transform(&leads[0]);
        assert_eq!(vector.len(), NUM_FEATURES);
        assert_eq!(vector, vec![4.0, 300.0, 2.5, 2.0, 2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_absent_and_unseen_map_to_unknown() {
        let encoder = FeatureEncoder::fit(&training_leads());
        let fresh = Lead::new(10)
            .with_source("Partner Referral")
            .with_last_activity("Visited Booth");
        let vector = encoder.transform(&fresh);
        assert_eq!(vector[3], UNKNOWN_CODE);
        assert_eq!(vector[4], UNKNOWN_CODE);
        assert_eq!(vector[5], UNKNOWN_CODE);
        assert_eq!(vector[6], UNKNOWN_CODE);
    }

    #[test]
    fn test_refit_is_order_independent() {
        let mut leads = training_leads();
        let first = FeatureEncoder::fit(&leads);
        leads.reverse();
        let second = FeatureEncoder::fit(&leads);
        assert_eq!(first, second);
        assert_eq!(
            first.transform_batch(&leads),
            second.transform_batch(&leads)
        );
    }

    #[test]
    fn test_vocabulary_deserializes_sorted() {
        let vocabulary: Vocabulary = serde_json::from_str(r#"["b", "a", "b"]"#).unwrap();
        assert_eq!(vocabulary.categories(), ["a", "b"]);
        assert_eq!(vocabulary.code(Some("b")), 2.0);
    }
}
