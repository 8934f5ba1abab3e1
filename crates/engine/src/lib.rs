//! Lead scoring engine
//!
//! Features:
//! - Rule-based 0-100 score with per-rule breakdown and priority tiers
//! - Categorical feature encoding with a reserved unknown code
//! - Random-forest conversion model with seeded hold-out evaluation
//! - Shortlist ranking with a total, input-order independent ordering
//! - Batch analysis report (conversion by source, behaviour, tiers)

pub mod analysis;
pub mod encoder;
pub mod engine;
pub mod model;
pub mod ranker;
pub mod rule_scorer;

pub use analysis::{
    AnalysisReport, BehaviorMetric, ModelSummary, ScoreSummary, SourceConversion,
    TierConversion, TierShare,
};
pub use encoder::{
    FeatureEncoder, FittedEncoder, Vocabulary, FEATURE_NAMES, NUM_FEATURES, UNKNOWN_CODE,
};
pub use engine::LeadScoringEngine;
pub use model::{ConversionModel, EvaluationReport, FeatureImportance, TrainingOutcome};
pub use ranker::{shortlist, LeadRanker};
pub use rule_scorer::RuleScorer;

// Re-export the data model so callers need only this crate
pub use lead_scoring_core::{
    Error, Lead, LeadId, LeadQuality, PriorityTier, Result, ScoreBreakdown, ScoredLead,
};
