//! Best-effort date parsing for feed and search timestamps.
//!
//! arXiv's Atom API emits RFC 3339, its RSS feeds emit RFC 2822, and users
//! type plain calendar dates. Everything is normalised to `DateTime<Utc>`.
//! A value that matches no known layout is an [`UnparseableDateError`],
//! which callers absorb into "no date available".

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

/// Layouts with a time component but no offset; interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date-only layouts; interpreted as UTC midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%B %d, %Y"];

/// The input matched none of the supported date layouts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unparseable date: {raw:?}")]
pub struct UnparseableDateError {
    pub raw: String,
}

/// Parses a date/time string into a UTC timestamp.
///
/// Tries RFC 3339, RFC 2822, then the naive layouts above. Surrounding
/// whitespace is ignored.
///
/// # Errors
///
/// Returns [`UnparseableDateError`] for empty input or unknown layouts.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, UnparseableDateError> {
    let value = raw.trim();
    let unparseable = || UnparseableDateError {
        raw: raw.to_string(),
    };

    if value.is_empty() {
        return Err(unparseable());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(start_of_day(date));
        }
    }

    Err(unparseable())
}

/// Like [`parse_date`], but logs and discards the failure.
pub fn parse_date_opt(raw: &str) -> Option<DateTime<Utc>> {
    match parse_date(raw) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(error = %e, "Treating date as absent");
            None
        }
    }
}

/// UTC midnight of a calendar date, used as the filter's lower bound.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
