//! Exploratory summaries over a lead batch

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use lead_scoring_core::{Lead, PriorityTier, ScoredLead};

use crate::model::{EvaluationReport, FeatureImportance};

/// Conversion statistics for one acquisition channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConversion {
    pub source: String,
    /// Labelled leads from this source
    pub total: usize,
    pub converted: usize,
    pub rate: f64,
}

/// Conversion rate per source over labelled leads with a known source
///
/// Sources with fewer than `min_leads` labelled leads are dropped. Sorted by
/// rate descending, then by source name.
pub fn conversion_by_source(leads: &[Lead], min_leads: usize) -> Vec<SourceConversion> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for lead in leads.iter().filter(|l| l.is_labelled()) {
        if let Some(source) = lead.source() {
            let entry = counts.entry(source).or_default();
            entry.0 += 1;
            if lead.is_converted() {
                entry.1 += 1;
            }
        }
    }

    let mut rows: Vec<SourceConversion> = counts
        .into_iter()
        .filter(|(_, (total, _))| *total >= min_leads)
        .map(|(source, (total, converted))| SourceConversion {
            source: source.to_string(),
            total,
            converted,
            rate: converted as f64 / total as f64,
        })
        .collect();

    // BTreeMap order already sorts by name; the stable sort keeps it for ties
    rows.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    rows
}

/// Converted vs not-converted mean of one behavioural measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMetric {
    pub metric: String,
    pub converted_mean: f64,
    pub not_converted_mean: f64,
    /// `(converted / not_converted - 1) * 100`; 0 when the
    /// not-converted mean is 0
    pub difference_pct: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compare visits, time on site and page views across outcomes
///
/// Unlabelled leads are ignored; absent values count as 0.
pub fn behavior_comparison(leads: &[Lead]) -> Vec<BehaviorMetric> {
    let measures: [(&str, fn(&Lead) -> f64); 3] = [
        ("total_visits", |l| f64::from(l.visits())),
        ("time_on_site", Lead::time_on_site_secs),
        ("page_views_per_visit", Lead::page_views),
    ];

    measures
        .iter()
        .map(|(metric, value)| {
            let converted_mean = mean(
                leads
                    .iter()
                    .filter(|l| l.converted == Some(true))
                    .map(value),
            );
            let not_converted_mean = mean(
                leads
                    .iter()
                    .filter(|l| l.converted == Some(false))
                    .map(value),
            );
            let difference_pct = if not_converted_mean > 0.0 {
                (converted_mean / not_converted_mean - 1.0) * 100.0
            } else {
                0.0
            };
            BehaviorMetric {
                metric: (*metric).to_string(),
                converted_mean,
                not_converted_mean,
                difference_pct,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierShare {
    pub tier: PriorityTier,
    pub count: usize,
    /// Fraction of all scored leads, in `[0, 1]`
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub leads: usize,
    pub mean_score: f64,
    pub max_score: u32,
    /// Every tier, highest first
    pub tiers: Vec<TierShare>,
}

pub fn score_summary(scored: &[ScoredLead]) -> ScoreSummary {
    let leads = scored.len();
    let tiers = PriorityTier::ALL
        .iter()
        .map(|&tier| {
            let count = scored.iter().filter(|s| s.priority_tier == tier).count();
            TierShare {
                tier,
                count,
                share: if leads == 0 {
                    0.0
                } else {
                    count as f64 / leads as f64
                },
            }
        })
        .collect();

    ScoreSummary {
        leads,
        mean_score: mean(scored.iter().map(|s| f64::from(s.score))),
        max_score: scored.iter().map(|s| s.score).max().unwrap_or(0),
        tiers,
    }
}

/// Observed conversion within one priority tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConversion {
    pub tier: PriorityTier,
    pub labelled: usize,
    pub converted: usize,
    /// 0 when the tier has no labelled leads
    pub rate: f64,
}

/// How well the rule tiers line up with actual outcomes
pub fn conversion_by_tier(scored: &[ScoredLead]) -> Vec<TierConversion> {
    PriorityTier::ALL
        .iter()
        .map(|&tier| {
            let in_tier = scored
                .iter()
                .filter(|s| s.priority_tier == tier && s.lead.is_labelled());
            let (labelled, converted) = in_tier.fold((0, 0), |(n, c), s| {
                (n + 1, c + usize::from(s.is_converted()))
            });
            TierConversion {
                tier,
                labelled,
                converted,
                rate: if labelled == 0 {
                    0.0
                } else {
                    converted as f64 / labelled as f64
                },
            }
        })
        .collect()
}

/// Model diagnostics included in the batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub evaluation: EvaluationReport,
    pub feature_importance: Vec<FeatureImportance>,
}

/// Everything the batch analysis produces, ready to serialise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub total_leads: usize,
    pub labelled_leads: usize,
    /// Over labelled leads; 0 when none are labelled
    pub conversion_rate: f64,
    pub conversion_by_source: Vec<SourceConversion>,
    pub behavior: Vec<BehaviorMetric>,
    pub score_summary: ScoreSummary,
    pub conversion_by_tier: Vec<TierConversion>,
    pub model: ModelSummary,
    /// Size of the full shortlist before truncation
    pub shortlisted: usize,
    /// First `top_n` shortlisted leads
    pub top_leads: Vec<ScoredLead>,
}

/// Overall conversion rate over labelled leads
pub fn conversion_rate(leads: &[Lead]) -> f64 {
    mean(
        leads
            .iter()
            .filter(|l| l.is_labelled())
            .map(|l| if l.is_converted() { 1.0 } else { 0.0 }),
    )
}
