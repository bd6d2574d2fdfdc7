//! Core observation type for waitboard.
//!
//! An observation is one submitted wait-time reading. It is created by the
//! storage layer, which assigns the id and timestamp, and is never mutated
//! afterwards.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Text format used to persist `submitted_at`.
///
/// Fixed width and zero padded, so lexicographic order in `SQLite` matches
/// chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single wait-time observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Unique identifier, assigned by storage in insertion order.
    pub id: i64,

    /// Wait time in minutes. Never negative.
    pub value: i64,

    /// When the observation was recorded (UTC, whole seconds).
    pub submitted_at: DateTime<Utc>,
}

/// Reject negative wait times.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `value` is negative.
pub fn validate_value(value: i64) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!(
            "wait time must be a non-negative number of minutes, got {value}"
        )));
    }
    Ok(())
}

/// Format a timestamp for storage, dropping sub-second precision.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.trunc_subsecs(0).format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// # Errors
///
/// Returns the chrono parse error if `raw` does not match [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}
