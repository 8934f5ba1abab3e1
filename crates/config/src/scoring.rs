//! Rule scoring configuration
//!
//! Each rule is either a lookup table (exact category match) or a threshold
//! ladder (first step whose threshold the value strictly exceeds). Every rule
//! declares a cap; validation refuses tables that could exceed it or ladders
//! that would make the score non-monotonic.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{self, caps};
use crate::ConfigError;

/// Rule weights, loaded from the `scoring` section or a standalone YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Acquisition channel points
    #[serde(default = "default_source")]
    pub source: LookupWeights,
    /// Time-on-site ladder (seconds)
    #[serde(default = "default_engagement")]
    pub engagement: ThresholdLadder,
    /// Last activity points
    #[serde(default = "default_activity")]
    pub activity: LookupWeights,
    /// Visit-count ladder
    #[serde(default = "default_visits")]
    pub visits: ThresholdLadder,
    /// Lead quality points
    #[serde(default)]
    pub quality: QualityWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            engagement: default_engagement(),
            activity: default_activity(),
            visits: default_visits(),
            quality: QualityWeights::default(),
        }
    }
}

fn default_source() -> LookupWeights {
    LookupWeights::from_table(caps::SOURCE, constants::SOURCE_WEIGHTS)
}

fn default_engagement() -> ThresholdLadder {
    ThresholdLadder::from_steps(caps::ENGAGEMENT, constants::ENGAGEMENT_STEPS)
}

fn default_activity() -> LookupWeights {
    LookupWeights::from_table(caps::ACTIVITY, constants::ACTIVITY_WEIGHTS)
}

fn default_visits() -> ThresholdLadder {
    ThresholdLadder::from_steps(caps::VISITS, constants::VISIT_STEPS)
}

impl ScoringConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let config: ScoringConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate("scoring.source")?;
        self.engagement.validate("scoring.engagement")?;
        self.activity.validate("scoring.activity")?;
        self.visits.validate("scoring.visits")?;
        self.quality.validate("scoring.quality")?;
        Ok(())
    }

    /// Sum of all rule caps; may exceed the 100-point score ceiling
    pub fn max_raw_total(&self) -> u32 {
        self.source.max_points
            + self.engagement.max_points
            + self.activity.max_points
            + self.visits.max_points
            + self.quality.max_points
    }
}

/// One row of a lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub category: String,
    pub points: u32,
}

/// Exact-match table from category to points; unmatched keys score 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupWeights {
    pub max_points: u32,
    #[serde(default)]
    pub entries: Vec<CategoryWeight>,
}

impl LookupWeights {
    pub fn from_table(max_points: u32, table: &[(&str, u32)]) -> Self {
        Self {
            max_points,
            entries: table
                .iter()
                .map(|(category, points)| CategoryWeight {
                    category: (*category).to_string(),
                    points: *points,
                })
                .collect(),
        }
    }

    /// Points for a category; absent or unknown categories score 0
    pub fn points(&self, category: Option<&str>) -> u32 {
        category
            .and_then(|c| self.entries.iter().find(|e| e.category == c))
            .map(|e| e.points.min(self.max_points))
            .unwrap_or(0)
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.points > self.max_points {
                return Err(ConfigError::invalid(
                    format!("{}.entries[{}]", field, i),
                    format!(
                        "{:?} scores {} points, above the cap of {}",
                        entry.category, entry.points, self.max_points
                    ),
                ));
            }
            if self.entries[..i].iter().any(|e| e.category == entry.category) {
                return Err(ConfigError::invalid(
                    format!("{}.entries[{}]", field, i),
                    format!("duplicate category {:?}", entry.category),
                ));
            }
        }
        Ok(())
    }
}

/// One rung of a threshold ladder
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdStep {
    /// The value must be strictly greater than this
    pub above: f64,
    pub points: u32,
}

/// Step function evaluated top-down; first matching rung wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdLadder {
    pub max_points: u32,
    #[serde(default)]
    pub steps: Vec<ThresholdStep>,
}

impl ThresholdLadder {
    pub fn from_steps(max_points: u32, steps: &[(f64, u32)]) -> Self {
        Self {
            max_points,
            steps: steps
                .iter()
                .map(|&(above, points)| ThresholdStep { above, points })
                .collect(),
        }
    }

    /// Points for a value; values at or below the lowest rung score 0
    pub fn points(&self, value: f64) -> u32 {
        self.steps
            .iter()
            .find(|step| value > step.above)
            .map(|step| step.points.min(self.max_points))
            .unwrap_or(0)
    }

    /// Rungs must descend strictly in threshold and never gain points
    /// on the way down, so crossing a higher threshold never lowers the score.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        for (i, step) in self.steps.iter().enumerate() {
            if !step.above.is_finite() {
                return Err(ConfigError::invalid(
                    format!("{}.steps[{}].above", field, i),
                    format!("must be finite, got {}", step.above),
                ));
            }
            if step.points > self.max_points {
                return Err(ConfigError::invalid(
                    format!("{}.steps[{}].points", field, i),
                    format!("{} is above the cap of {}", step.points, self.max_points),
                ));
            }
            if i > 0 {
                let prev = &self.steps[i - 1];
                if step.above >= prev.above {
                    return Err(ConfigError::invalid(
                        format!("{}.steps[{}].above", field, i),
                        format!(
                            "thresholds must strictly descend ({} follows {})",
                            step.above, prev.above
                        ),
                    ));
                }
                if step.points > prev.points {
                    return Err(ConfigError::invalid(
                        format!("{}.steps[{}].points", field, i),
                        format!(
                            "lower rung scores more than the one above ({} > {})",
                            step.points, prev.points
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Lead quality points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityWeights {
    pub max_points: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for QualityWeights {
    fn default() -> Self {
        let (high, medium, low) = constants::QUALITY_WEIGHTS;
        Self {
            max_points: caps::QUALITY,
            high,
            medium,
            low,
        }
    }
}

impl QualityWeights {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.high > self.max_points {
            return Err(ConfigError::invalid(
                format!("{}.high", field),
                format!("{} is above the cap of {}", self.high, self.max_points),
            ));
        }
        if !(self.high >= self.medium && self.medium >= self.low) {
            return Err(ConfigError::invalid(
                field,
                format!(
                    "points must satisfy high >= medium >= low, got {}/{}/{}",
                    self.high, self.medium, self.low
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_match_constants() {
        let config = ScoringConfig::default();
        for (source, points) in constants::SOURCE_WEIGHTS {
            assert_eq!(config.source.points(Some(source)), *points);
        }
        for (activity, points) in constants::ACTIVITY_WEIGHTS {
            assert_eq!(config.activity.points(Some(activity)), *points);
        }
        assert_eq!(config.source.points(Some("Unknown Channel")), 0);
        assert_eq!(config.activity.points(None), 0);
        assert_eq!(config.max_raw_total(), 110);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ladder_is_exclusive_lower_bound() {
        let config = ScoringConfig::default();
        assert_eq!(config.engagement.points(1200.0), 20);
        assert_eq!(config.engagement.points(1000.0), 15);
        assert_eq!(config.engagement.points(500.0), 10);
        assert_eq!(config.engagement.points(201.0), 10);
        assert_eq!(config.engagement.points(200.0), 5);
        assert_eq!(config.engagement.points(0.5), 5);
        assert_eq!(config.engagement.points(0.0), 0);

        assert_eq!(config.visits.points(6.0), 10);
        assert_eq!(config.visits.points(5.0), 5);
        assert_eq!(config.visits.points(3.0), 5);
        assert_eq!(config.visits.points(2.0), 0);
    }

    #[test]
    fn test_rejects_entry_above_cap() {
        let mut config = ScoringConfig::default();
        config.source.entries.push(CategoryWeight {
            category: "Partner".to_string(),
            points: 45,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_category() {
        let mut config = ScoringConfig::default();
        config.activity.entries.push(CategoryWeight {
            category: "SMS Sent".to_string(),
            points: 1,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_monotonic_ladder() {
        let mut config = ScoringConfig::default();
        config.engagement = ThresholdLadder::from_steps(20, &[(1000.0, 10), (500.0, 15)]);
        assert!(config.validate().is_err());

        config.engagement = ThresholdLadder::from_steps(20, &[(500.0, 15), (1000.0, 10)]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scoring_config_deserialization() {
        let yaml = r#"
source:
  max_points: 40
  entries:
    - category: Partner Referral
      points: 30
    - category: Google
      points: 20
visits:
  max_points: 10
  steps:
    - above: 10
      points: 10
    - above: 4
      points: 6
"#;
        let config: ScoringConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.points(Some("Partner Referral")), 30);
        assert_eq!(config.source.points(Some("Welingak Website")), 0);
        assert_eq!(config.visits.points(5.0), 6);
        // Sections not present fall back to the default tables
        assert_eq!(config.activity.points(Some("SMS Sent")), 20);
        assert_eq!(config.quality.high, 15);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.yaml");
        std::fs::write(
            &path,
            "quality:\n  max_points: 15\n  high: 12\n  medium: 8\n  low: 2\n",
        )
        .unwrap();
        let config = ScoringConfig::load(&path).unwrap();
        assert_eq!(config.quality.high, 12);

        let missing = ScoringConfig::load(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));
    }
}
