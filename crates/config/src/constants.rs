//! Named weight tables and default parameters
//!
//! Single source of truth for the rule weights. `ScoringConfig::default()`
//! is assembled from these tables, and tests enumerate them directly.

/// Acquisition channel points (cap 40). Unlisted sources score 0.
pub const SOURCE_WEIGHTS: &[(&str, u32)] = &[
    ("Welingak Website", 40),
    ("Reference", 35),
    ("Google", 20),
    ("Organic Search", 15),
    ("Direct Traffic", 10),
    ("Olark Chat", 5),
];

/// Last activity points (cap 25). Unlisted activities score 0.
pub const ACTIVITY_WEIGHTS: &[(&str, u32)] = &[
    ("Had a Phone Conversation", 25),
    ("SMS Sent", 20),
    ("Email Opened", 10),
    ("Email Link Clicked", 5),
];

/// Time-on-site ladder as `(strictly above seconds, points)`, top-down (cap 20)
pub const ENGAGEMENT_STEPS: &[(f64, u32)] = &[(1000.0, 20), (500.0, 15), (200.0, 10), (0.0, 5)];

/// Visit-count ladder as `(strictly above visits, points)`, top-down (cap 10)
pub const VISIT_STEPS: &[(f64, u32)] = &[(5.0, 10), (2.0, 5)];

/// Lead quality points as `(high, medium, low)` (cap 15)
pub const QUALITY_WEIGHTS: (u32, u32, u32) = (15, 10, 5);

/// Per-rule caps
pub mod caps {
    pub const SOURCE: u32 = 40;
    pub const ENGAGEMENT: u32 = 20;
    pub const ACTIVITY: u32 = 25;
    pub const VISITS: u32 = 10;
    pub const QUALITY: u32 = 15;
}

/// Training defaults
pub mod training {
    /// Fraction of labelled leads held out for evaluation
    pub const TEST_FRACTION: f64 = 0.2;
    pub const SEED: u64 = 42;
    pub const N_TREES: usize = 100;
    pub const MIN_SAMPLES_SPLIT: usize = 2;
    pub const MIN_SAMPLES_LEAF: usize = 1;
    pub const DECISION_THRESHOLD: f64 = 0.5;
}

/// Ranking defaults
pub mod ranking {
    pub const MIN_SCORE: u32 = 60;
    /// Shortlist length shown to the sales team
    pub const TOP_N: usize = 10;
    /// Minimum leads per source before its conversion rate is reported
    pub const MIN_LEADS_PER_SOURCE: usize = 50;
}
