//! Shortlist selection
//!
//! Filters scored leads and orders them by descending score, ties broken by
//! ascending id, so the output is a total order regardless of input order.
//! Truncation to a top-N is left to the caller.

use std::cmp::Reverse;

use lead_scoring_config::RankingConfig;
use lead_scoring_core::{Error, Result, ScoredLead, MAX_SCORE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadRanker {
    min_score: u32,
    exclude_converted: bool,
}

impl LeadRanker {
    /// Fails with `InvalidThreshold` when `min_score` exceeds 100
    pub fn new(min_score: u32, exclude_converted: bool) -> Result<Self> {
        if min_score > MAX_SCORE {
            return Err(Error::invalid_threshold("min_score", min_score, "0..=100"));
        }
        Ok(Self {
            min_score,
            exclude_converted,
        })
    }

    pub fn from_config(config: &RankingConfig) -> Result<Self> {
        Self::new(config.min_score, config.exclude_converted)
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    pub fn excludes_converted(&self) -> bool {
        self.exclude_converted
    }

    fn keeps(&self, lead: &ScoredLead) -> bool {
        lead.score >= self.min_score && !(self.exclude_converted && lead.is_converted())
    }

    pub fn shortlist(&self, leads: &[ScoredLead]) -> Vec<ScoredLead> {
        let mut selected: Vec<ScoredLead> =
            leads.iter().filter(|l| self.keeps(l)).cloned().collect();
        selected.sort_by_key(|l| (Reverse(l.score), l.id()));

        tracing::debug!(
            candidates = leads.len(),
            selected = selected.len(),
            min_score = self.min_score,
            "Built shortlist"
        );
        selected
    }
}

/// One-shot `LeadRanker::new(..)?.shortlist(..)`
pub fn shortlist(
    leads: &[ScoredLead],
    min_score: u32,
    exclude_converted: bool,
) -> Result<Vec<ScoredLead>> {
    Ok(LeadRanker::new(min_score, exclude_converted)?.shortlist(leads))
}
