//! Core types for the lead scoring engine
//!
//! This crate provides the types shared by every other crate:
//! - `Lead` records as supplied by the data-loading layer
//! - Derived `ScoredLead` records with score breakdown and priority tier
//! - The error taxonomy used across scoring, encoding, training and ranking

pub mod error;
pub mod lead;
pub mod scored;

pub use error::{Error, Result};
pub use lead::{Lead, LeadId, LeadQuality};
pub use scored::{PriorityTier, ScoreBreakdown, ScoredLead, MAX_SCORE};
