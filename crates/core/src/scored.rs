//! Scored leads and priority tiers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::lead::{Lead, LeadId};

/// Upper bound of the rule score
pub const MAX_SCORE: u32 = 100;

/// Coarse call-list bucket derived from the rule score
///
/// The tiers partition `0..=100` without gaps or overlap:
/// `[70,100]` HIGH, `[50,70)` MEDIUM, `[30,50)` LOW, `[0,30)` VERY_LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
    VeryLow,
}

impl PriorityTier {
    /// All tiers, highest priority first
    pub const ALL: [PriorityTier; 4] = [
        PriorityTier::High,
        PriorityTier::Medium,
        PriorityTier::Low,
        PriorityTier::VeryLow,
    ];

    pub fn from_score(score: u32) -> Self {
        match score {
            0..=29 => PriorityTier::VeryLow,
            30..=49 => PriorityTier::Low,
            50..=69 => PriorityTier::Medium,
            _ => PriorityTier::High,
        }
    }

    /// Lowest score that lands in this tier
    pub fn min_score(&self) -> u32 {
        match self {
            PriorityTier::High => 70,
            PriorityTier::Medium => 50,
            PriorityTier::Low => 30,
            PriorityTier::VeryLow => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::High => "HIGH",
            PriorityTier::Medium => "MEDIUM",
            PriorityTier::Low => "LOW",
            PriorityTier::VeryLow => "VERY_LOW",
        }
    }

    /// Next step for the sales team
    pub fn recommended_action(&self) -> &'static str {
        match self {
            PriorityTier::High => "Immediate contact: call today",
            PriorityTier::Medium => "Send relevant content and schedule a follow-up",
            PriorityTier::Low => "Include in the email marketing campaign",
            PriorityTier::VeryLow => "Requalify or move to nurturing",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-rule contribution to the score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Acquisition channel (0-40)
    pub source: u32,
    /// Time on site (0-20)
    pub engagement: u32,
    /// Last recorded activity (0-25)
    pub activity: u32,
    /// Visit frequency (0-10)
    pub visits: u32,
    /// Lead quality rating (0-15)
    pub quality: u32,
}

impl ScoreBreakdown {
    /// Sum of the sub-scores before clamping; may exceed `MAX_SCORE`
    pub fn raw_total(&self) -> u32 {
        self.source + self.engagement + self.activity + self.visits + self.quality
    }

    pub fn total(&self) -> u32 {
        self.raw_total().min(MAX_SCORE)
    }
}

/// A lead with its derived rule score
///
/// Recomputed whenever scoring runs; the `Lead` stays authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLead {
    #[serde(flatten)]
    pub lead: Lead,
    pub score: u32,
    pub priority_tier: PriorityTier,
    pub breakdown: ScoreBreakdown,
    /// Present only when a trained conversion model was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_probability: Option<f64>,
}

impl ScoredLead {
    pub fn new(lead: Lead, breakdown: ScoreBreakdown) -> Self {
        let score = breakdown.total();
        Self {
            lead,
            score,
            priority_tier: PriorityTier::from_score(score),
            breakdown,
            conversion_probability: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.conversion_probability = Some(probability);
        self
    }

    pub fn id(&self) -> LeadId {
        self.lead.id
    }

    pub fn is_converted(&self) -> bool {
        self.lead.is_converted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(PriorityTier::from_score(0), PriorityTier::VeryLow);
        assert_eq!(PriorityTier::from_score(29), PriorityTier::VeryLow);
        assert_eq!(PriorityTier::from_score(30), PriorityTier::Low);
        assert_eq!(PriorityTier::from_score(49), PriorityTier::Low);
        assert_eq!(PriorityTier::from_score(50), PriorityTier::Medium);
        assert_eq!(PriorityTier::from_score(69), PriorityTier::Medium);
        assert_eq!(PriorityTier::from_score(70), PriorityTier::High);
        assert_eq!(PriorityTier::from_score(100), PriorityTier::High);
    }

    #[test]
    fn test_tiers_partition_score_range() {
        for score in 0..=MAX_SCORE {
            let matching: Vec<_> = PriorityTier::ALL
                .iter()
                .filter(|tier| {
                    let upper = match tier {
                        PriorityTier::High => MAX_SCORE + 1,
                        PriorityTier::Medium => 70,
                        PriorityTier::Low => 50,
                        PriorityTier::VeryLow => 30,
                    };
                    score >= tier.min_score() && score < upper
                })
                .collect();
            assert_eq!(matching.len(), 1, "score {} matched {:?}", score, matching);
            assert_eq!(*matching[0], PriorityTier::from_score(score));
        }
    }

    #[test]
    fn test_breakdown_clamps_total() {
        let breakdown = ScoreBreakdown {
            source: 40,
            engagement: 20,
            activity: 25,
            visits: 10,
            quality: 15,
        };
        assert_eq!(breakdown.raw_total(), 110);
        assert_eq!(breakdown.total(), 100);
    }

    #[test]
    fn test_scored_lead_serializes_flat() {
        let scored = ScoredLead::new(
            Lead::new(2).with_source("Google"),
            ScoreBreakdown {
                source: 20,
                ..ScoreBreakdown::default()
            },
        );
        let value = serde_json::to_value(&scored).unwrap();
        assert_eq!(value["id"], 2);
        assert_eq!(value["score"], 20);
        assert_eq!(value["priorityTier"], "VERY_LOW");
        assert!(value.get("conversionProbability").is_none());

        let back: ScoredLead = serde_json::from_value(value).unwrap();
        assert_eq!(back, scored);
    }
}
