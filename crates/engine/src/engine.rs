//! Lead scoring facade
//!
//! Owns the rule scorer and, once trained or loaded, a shared conversion
//! model. The model sits behind an `Arc` so batch callers can hand clones to
//! worker threads; it is immutable after training.

use std::sync::Arc;

use lead_scoring_config::{RankingConfig, ScoringConfig, Settings, TrainingConfig};
use lead_scoring_core::{Error, Lead, PriorityTier, Result, ScoredLead};

use crate::analysis::{self, AnalysisReport, ModelSummary};
use crate::model::{ConversionModel, EvaluationReport};
use crate::ranker::LeadRanker;
use crate::rule_scorer::RuleScorer;

#[derive(Debug, Clone, Default)]
pub struct LeadScoringEngine {
    scorer: RuleScorer,
    model: Option<Arc<ConversionModel>>,
}

impl LeadScoringEngine {
    /// Engine with the built-in weight tables and no model
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scoring_config(config: ScoringConfig) -> Self {
        Self {
            scorer: RuleScorer::with_config(config),
            model: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_scoring_config(settings.scoring.clone())
    }

    /// Install a previously trained model
    pub fn with_model(mut self, model: ConversionModel) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    pub fn set_model(&mut self, model: Arc<ConversionModel>) {
        self.model = Some(model);
    }

    pub fn model(&self) -> Option<&Arc<ConversionModel>> {
        self.model.as_ref()
    }

    pub fn scorer(&self) -> &RuleScorer {
        &self.scorer
    }

    pub fn tier(&self, score: u32) -> PriorityTier {
        self.scorer.tier(score)
    }

    /// Rule score, plus conversion probability when a model is installed
    pub fn score(&self, lead: &Lead) -> ScoredLead {
        let scored = self.scorer.score_lead(lead);
        match &self.model {
            Some(model) => scored.with_probability(model.predict_lead(lead)),
            None => scored,
        }
    }

    pub fn score_all(&self, leads: &[Lead]) -> Vec<ScoredLead> {
        leads.iter().map(|lead| self.score(lead)).collect()
    }

    /// Fails with `UnfittedEncoder` until a model is trained or installed
    pub fn conversion_probability(&self, lead: &Lead) -> Result<f64> {
        self.model
            .as_ref()
            .map(|model| model.predict_lead(lead))
            .ok_or(Error::UnfittedEncoder)
    }

    /// Train on the labelled subset of `leads` and install the result
    ///
    /// The previous model, if any, stays in place when training fails.
    pub fn train(&mut self, leads: &[Lead], config: &TrainingConfig) -> Result<EvaluationReport> {
        let outcome = ConversionModel::train(leads, config)?;
        self.model = Some(Arc::new(outcome.model));
        Ok(outcome.evaluation)
    }

    /// Score every lead, then filter and order
    pub fn shortlist(&self, leads: &[Lead], config: &RankingConfig) -> Result<Vec<ScoredLead>> {
        let ranker = LeadRanker::from_config(config)?;
        Ok(ranker.shortlist(&self.score_all(leads)))
    }

    /// Full batch analysis: exploratory tables, rule scoring, model training
    /// and evaluation, then the shortlist
    ///
    /// Installs the trained model, so the shortlisted leads carry conversion
    /// probabilities.
    pub fn analyze(&mut self, leads: &[Lead], settings: &Settings) -> Result<AnalysisReport> {
        let ranker = LeadRanker::from_config(&settings.ranking)?;

        let labelled_leads = leads.iter().filter(|l| l.is_labelled()).count();
        let conversion_rate = analysis::conversion_rate(leads);
        tracing::info!(
            leads = leads.len(),
            labelled = labelled_leads,
            conversion_rate,
            "Starting lead analysis"
        );

        let evaluation = self.train(leads, &settings.training)?;
        let feature_importance = self
            .model
            .as_ref()
            .map(|model| model.feature_importance())
            .unwrap_or_default();

        let scored = self.score_all(leads);
        let shortlist = ranker.shortlist(&scored);
        let shortlisted = shortlist.len();
        let top_leads: Vec<ScoredLead> = shortlist
            .into_iter()
            .take(settings.ranking.top_n)
            .collect();

        tracing::info!(
            shortlisted,
            min_score = ranker.min_score(),
            "Lead analysis complete"
        );

        Ok(AnalysisReport {
            total_leads: leads.len(),
            labelled_leads,
            conversion_rate,
            conversion_by_source: analysis::conversion_by_source(
                leads,
                settings.ranking.min_leads_per_source,
            ),
            behavior: analysis::behavior_comparison(leads),
            score_summary: analysis::score_summary(&scored),
            conversion_by_tier: analysis::conversion_by_tier(&scored),
            model: ModelSummary {
                evaluation,
                feature_importance,
            },
            shortlisted,
            top_leads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_scoring_core::LeadQuality;

    fn history() -> Vec<Lead> {
        (0..80)
            .map(|i| {
                let converted = i % 4 == 0;
                let lead = Lead::new(i).with_converted(converted);
                if converted {
                    lead.with_source("Reference")
                        .with_time_on_site(1100.0)
                        .with_last_activity("SMS Sent")
                        .with_total_visits(6)
                } else {
                    lead.with_source("Google").with_time_on_site(60.0 + i as f64)
                }
            })
            .collect()
    }

    fn quick_settings() -> Settings {
        let mut settings = Settings::default();
        settings.training.n_trees = 10;
        settings
    }

    #[test]
    fn test_probability_requires_model() {
        let engine = LeadScoringEngine::new();
        let lead = Lead::new(1).with_source("Google");
        assert!(matches!(
            engine.conversion_probability(&lead),
            Err(Error::UnfittedEncoder)
        ));
        assert!(engine.score(&lead).conversion_probability.is_none());
    }

    #[test]
    fn test_train_installs_model() {
        let mut engine = LeadScoringEngine::new();
        engine.train(&history(), &quick_settings().training).unwrap();
        assert!(engine.model().is_some());

        let lead = Lead::new(500)
            .with_source("Reference")
            .with_time_on_site(1100.0)
            .with_quality(LeadQuality::High);
        let probability = engine.conversion_probability(&lead).unwrap();
        assert!((0.0..=1.0).contains(&probability));
        assert_eq!(engine.score(&lead).conversion_probability, Some(probability));
    }

    #[test]
    fn test_failed_training_keeps_previous_model() {
        let mut engine = LeadScoringEngine::new();
        engine.train(&history(), &quick_settings().training).unwrap();
        let single_class: Vec<Lead> = (0..5).map(|i| Lead::new(i).with_converted(true)).collect();
        assert!(engine.train(&single_class, &quick_settings().training).is_err());
        assert!(engine.model().is_some());
    }

    #[test]
    fn test_shortlist_scores_then_ranks() {
        let engine = LeadScoringEngine::new();
        let leads = vec![
            Lead::new(7).with_source("Welingak Website").with_time_on_site(600.0),
            Lead::new(3).with_source("Welingak Website").with_time_on_site(600.0),
            Lead::new(5).with_source("Google"),
        ];
        let config = RankingConfig {
            min_score: 50,
            ..RankingConfig::default()
        };
        let ids: Vec<_> = engine
            .shortlist(&leads, &config)
            .unwrap()
            .iter()
            .map(|s| s.id())
            .collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_analyze_produces_full_report() {
        let mut engine = LeadScoringEngine::new();
        let mut leads = history();
        leads.push(
            Lead::new(1000)
                .with_source("Reference")
                .with_time_on_site(1100.0)
                .with_last_activity("SMS Sent")
                .with_total_visits(6),
        );

        let mut settings = quick_settings();
        settings.ranking.min_leads_per_source = 10;
        let report = engine.analyze(&leads, &settings).unwrap();

        assert_eq!(report.total_leads, 81);
        assert_eq!(report.labelled_leads, 80);
        assert_eq!(report.conversion_rate, 0.25);
        assert_eq!(report.conversion_by_source[0].source, "Reference");
        assert_eq!(report.score_summary.tiers.len(), 4);
        assert_eq!(report.model.feature_importance.len(), 7);
        // Only the unlabelled hot lead survives the converted filter
        assert_eq!(report.shortlisted, 1);
        assert_eq!(report.top_leads[0].id(), 1000);
        assert!(report.top_leads[0].conversion_probability.is_some());
        assert!(serde_json::to_string(&report).is_ok());
    }
}
