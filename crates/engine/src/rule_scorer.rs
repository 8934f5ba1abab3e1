//! Rule-based lead scoring
//!
//! Five independently capped sub-scores (source, engagement time, last
//! activity, visit frequency, quality) are summed and clamped to 100.
//! The scorer holds only immutable weight tables, so it can be shared across
//! threads freely.

use lead_scoring_config::ScoringConfig;
use lead_scoring_core::{Lead, LeadQuality, PriorityTier, ScoreBreakdown, ScoredLead};

/// Deterministic, explainable lead scorer
#[derive(Debug, Clone, Default)]
pub struct RuleScorer {
    config: ScoringConfig,
}

impl RuleScorer {
    /// Scorer with the built-in weight tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Scorer with custom weight tables
    ///
    /// Callers are expected to pass a validated config (see
    /// `ScoringConfig::validate`); an unvalidated table can still never push
    /// a sub-score past its cap or the total past 100.
    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Per-rule points for a lead
    pub fn breakdown(&self, lead: &Lead) -> ScoreBreakdown {
        let config = &self.config;

        let quality = match lead.lead_quality {
            Some(LeadQuality::High) => config.quality.high,
            Some(LeadQuality::Medium) => config.quality.medium,
            Some(LeadQuality::Low) => config.quality.low,
            None => 0,
        }
        .min(config.quality.max_points);

        ScoreBreakdown {
            source: config.source.points(lead.source()),
            engagement: config.engagement.points(lead.time_on_site_secs()),
            activity: config.activity.points(lead.last_activity()),
            visits: config.visits.points(f64::from(lead.visits())),
            quality,
        }
    }

    /// Score in `0..=100`
    pub fn score(&self, lead: &Lead) -> u32 {
        self.breakdown(lead).total()
    }

    pub fn tier(&self, score: u32) -> PriorityTier {
        PriorityTier::from_score(score)
    }

    pub fn score_lead(&self, lead: &Lead) -> ScoredLead {
        ScoredLead::new(lead.clone(), self.breakdown(lead))
    }

    pub fn score_all(&self, leads: &[Lead]) -> Vec<ScoredLead> {
        leads.iter().map(|lead| self.score_lead(lead)).collect()
    }
}
