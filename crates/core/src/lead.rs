//! Lead records
//!
//! A `Lead` is an immutable input supplied by whatever loads the dataset.
//! Every optional field resolves to its default here, once, so scoring and
//! encoding code never has to decide what "absent" means:
//!
//! | Field               | Absent means                     |
//! |---------------------|----------------------------------|
//! | `source`            | unknown source, contributes 0    |
//! | `last_activity`     | unknown activity, contributes 0  |
//! | `lead_quality`      | no quality rating, contributes 0 |
//! | `time_on_site`      | 0 seconds                        |
//! | `total_visits`      | 0 visits                         |
//! | `page_views_per_visit` | 0                             |
//! | `converted`         | outcome not yet known            |
//!
//! Records deserialize from camelCase JSON as well as from the column names
//! used by historical CRM exports ("Lead Source", "TotalVisits", ...).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Externally assigned lead identifier
pub type LeadId = u64;

/// Sales-assessed lead quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadQuality {
    Low,
    Medium,
    High,
}

impl LeadQuality {
    /// Parse a quality label, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(LeadQuality::High),
            "medium" => Some(LeadQuality::Medium),
            "low" => Some(LeadQuality::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadQuality::High => "High",
            LeadQuality::Medium => "Medium",
            LeadQuality::Low => "Low",
        }
    }
}

impl fmt::Display for LeadQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One prospective customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(alias = "Lead Number")]
    pub id: LeadId,

    /// Acquisition channel, e.g. "Organic Search"
    #[serde(
        default,
        alias = "Lead Source",
        deserialize_with = "de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,

    /// Landing path, e.g. "Landing Page Submission"; model feature only
    #[serde(
        default,
        alias = "Lead Origin",
        deserialize_with = "de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub origin: Option<String>,

    #[serde(
        default,
        alias = "Last Activity",
        deserialize_with = "de::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_activity: Option<String>,

    #[serde(
        default,
        alias = "Lead Quality",
        deserialize_with = "de::quality",
        skip_serializing_if = "Option::is_none"
    )]
    pub lead_quality: Option<LeadQuality>,

    /// Total seconds spent on the website
    #[serde(
        default,
        alias = "Total Time Spent on Website",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_on_site: Option<f64>,

    #[serde(
        default,
        alias = "TotalVisits",
        deserialize_with = "de::visits",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_visits: Option<u32>,

    #[serde(
        default,
        alias = "Page Views Per Visit",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_views_per_visit: Option<f64>,

    /// Historical outcome; absent for leads awaiting a decision
    #[serde(
        default,
        alias = "Converted",
        deserialize_with = "de::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub converted: Option<bool>,
}

impl Lead {
    /// Create a lead with every optional field absent
    pub fn new(id: LeadId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_last_activity(mut self, activity: impl Into<String>) -> Self {
        self.last_activity = Some(activity.into());
        self
    }

    pub fn with_quality(mut self, quality: LeadQuality) -> Self {
        self.lead_quality = Some(quality);
        self
    }

    pub fn with_time_on_site(mut self, seconds: f64) -> Self {
        self.time_on_site = Some(seconds);
        self
    }

    pub fn with_total_visits(mut self, visits: u32) -> Self {
        self.total_visits = Some(visits);
        self
    }

    pub fn with_page_views_per_visit(mut self, views: f64) -> Self {
        self.page_views_per_visit = Some(views);
        self
    }

    pub fn with_converted(mut self, converted: bool) -> Self {
        self.converted = Some(converted);
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn last_activity(&self) -> Option<&str> {
        self.last_activity.as_deref()
    }

    /// Seconds on site; absent, negative and non-finite values read as 0
    pub fn time_on_site_secs(&self) -> f64 {
        non_negative(self.time_on_site)
    }

    pub fn visits(&self) -> u32 {
        self.total_visits.unwrap_or(0)
    }

    /// Page views per visit; absent, negative and non-finite values read as 0
    pub fn page_views(&self) -> f64 {
        non_negative(self.page_views_per_visit)
    }

    pub fn is_converted(&self) -> bool {
        self.converted == Some(true)
    }

    /// Whether the outcome is known (usable for training)
    pub fn is_labelled(&self) -> bool {
        self.converted.is_some()
    }

    /// Check numeric fields against their domains
    ///
    /// Accessors already coerce bad values to 0; this lets ingestion code
    /// report them instead of silently scoring them.
    pub fn validate(&self) -> Result<()> {
        check_non_negative(self.id, "timeOnSite", self.time_on_site)?;
        check_non_negative(self.id, "pageViewsPerVisit", self.page_views_per_visit)?;
        Ok(())
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn check_non_negative(lead_id: LeadId, field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(Error::InvalidField {
            lead_id,
            field,
            message: format!("must be finite, got {}", v),
        }),
        Some(v) if v < 0.0 => Err(Error::InvalidField {
            lead_id,
            field,
            message: format!("must be non-negative, got {}", v),
        }),
        _ => Ok(()),
    }
}

/// Lenient field decoders for exported datasets
mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::LeadQuality;

    pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.and_then(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }))
    }

    /// Unrecognised quality labels are treated as absent
    pub fn quality<'de, D>(deserializer: D) -> Result<Option<LeadQuality>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = blank_as_none(deserializer)?;
        Ok(value.and_then(|s| {
            let parsed = LeadQuality::parse(&s);
            if parsed.is_none() {
                tracing::debug!(value = %s, "Unrecognised lead quality, treating as absent");
            }
            parsed
        }))
    }

    /// Visit counts arrive as floats in some exports ("5.0")
    ///
    /// Negative counts are treated as absent so one bad row does not reject
    /// the whole batch.
    pub fn visits<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(None),
            Some(v) if v.is_finite() && v >= 0.0 => Ok(Some(v.min(u32::MAX as f64) as u32)),
            Some(v) => {
                tracing::warn!(value = v, "Invalid totalVisits, treating as absent");
                Ok(None)
            }
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    /// Outcome flags arrive as booleans, 0/1 or text
    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawFlag>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawFlag::Bool(b)) => Ok(Some(b)),
            Some(RawFlag::Number(n)) if n == 0.0 => Ok(Some(false)),
            Some(RawFlag::Number(n)) if n == 1.0 => Ok(Some(true)),
            Some(RawFlag::Number(n)) => Err(D::Error::custom(format!(
                "converted must be 0 or 1, got {}",
                n
            ))),
            Some(RawFlag::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "" => Ok(None),
                "1" | "true" | "yes" => Ok(Some(true)),
                "0" | "false" | "no" => Ok(Some(false)),
                other => Err(D::Error::custom(format!(
                    "converted must be a boolean, got {:?}",
                    other
                ))),
            },
        }
    }
}
