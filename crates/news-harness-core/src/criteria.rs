//! Filter criteria: the immutable (entity, date) scope of a retrieval
//! request.
//!
//! Criteria are the conversation-cache key, so cache-hit detection is a
//! single structural equality check rather than field-by-field string
//! comparison scattered through the pipeline.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Sentinel the assistant UI uses for "no entity filter".
const ALL_COMPANIES: &str = "all companies";

/// The scope of a retrieval request. Immutable; equality is used by the
/// conversation cache to detect "same scope as before".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against an article's entity
    /// tag, title, or body. `None` means no entity narrowing.
    pub entity: Option<String>,
    pub date: DateFilter,
}

impl FilterCriteria {
    /// Build criteria, normalizing the "no filter" states so that e.g.
    /// an empty string and `None` compare equal for cache purposes.
    pub fn new(entity: Option<&str>, date: DateFilter) -> Self {
        let entity = entity
            .map(str::trim)
            .filter(|e| !e.is_empty() && !e.eq_ignore_ascii_case(ALL_COMPANIES))
            .map(str::to_string);
        Self { entity, date }
    }
}

/// Temporal scope for a retrieval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    /// No temporal narrowing.
    #[default]
    All,
    /// Keep articles whose resolved date is on or after this calendar
    /// date (midnight UTC).
    Since(NaiveDate),
    /// Keep articles whose resolved date falls within the trailing
    /// window ending now.
    LastDays(i64),
}

impl DateFilter {
    /// Parse the filter strings the assistant UI exposes: `"All Dates"`,
    /// `"Last 7 days"`, `"Last 30 days"`, or an exact `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Result<Self, RetrievalError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all dates") {
            return Ok(DateFilter::All);
        }

        let lower = trimmed.to_lowercase();
        if let Some(rest) = lower.strip_prefix("last ") {
            if let Some(n) = rest.strip_suffix(" days").or_else(|| rest.strip_suffix(" day")) {
                let days: i64 = n.trim().parse().map_err(|_| {
                    RetrievalError::InvalidDateFilter(format!("bad day count in '{trimmed}'"))
                })?;
                if days < 1 {
                    return Err(RetrievalError::InvalidDateFilter(format!(
                        "window must be at least one day: '{trimmed}'"
                    )));
                }
                return Ok(DateFilter::LastDays(days));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(DateFilter::Since)
            .map_err(|_| {
                RetrievalError::InvalidDateFilter(format!(
                    "expected 'All Dates', 'Last N days', or YYYY-MM-DD, got '{trimmed}'"
                ))
            })
    }

    /// Lower bound for the resolved article date, if the filter has one.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateFilter::All => None,
            DateFilter::Since(date) => Some(date.and_hms_opt(0, 0, 0).unwrap().and_utc()),
            DateFilter::LastDays(days) => Some(now - Duration::days(*days)),
        }
    }
}
