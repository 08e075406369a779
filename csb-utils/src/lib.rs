//! Shared utility functions for CSB crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::NaiveDate;

    /// Canonical date format used by NDVI files and date keys: "YYYY-MM-DD"
    pub const ISO_FORMAT: &str = "%Y-%m-%d";

    /// Compact date format used by NASA POWER keys and query params: "YYYYMMDD"
    pub const COMPACT_FORMAT: &str = "%Y%m%d";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(ISO_FORMAT).to_string()
    }

    /// Format a NaiveDate as "YYYYMMDD"
    pub fn format_date_compact(date: &NaiveDate) -> String {
        date.format(COMPACT_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format.
    ///
    /// Anything after a `T` or a space (a time component) is ignored, so
    /// "2017-03-01T08:00:00Z" parses as the calendar date 2017-03-01.
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        let key = normalize_date_key(s)?;
        Ok(NaiveDate::parse_from_str(&key, ISO_FORMAT)?)
    }

    /// Parse a date string in "YYYYMMDD" format (POWER compact format)
    pub fn parse_date_compact(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), COMPACT_FORMAT)?)
    }

    /// Strip any time component and surrounding whitespace from a date string,
    /// leaving the "YYYY-MM-DD" key used for comparisons.
    pub fn normalize_date_key(s: &str) -> Result<String, DateError> {
        let trimmed = s.trim();
        let key = trimmed
            .split(|c: char| c == 'T' || c == ' ')
            .next()
            .unwrap_or_default();
        if key.len() != 10 || key.as_bytes()[4] != b'-' || key.as_bytes()[7] != b'-' {
            return Err(DateError(format!("not a YYYY-MM-DD date: {trimmed:?}")));
        }
        Ok(key.to_string())
    }

    /// Convert a "YYYY-MM-DD" (or timestamped) string to a "YYYYMMDD" key.
    pub fn to_compact_key(s: &str) -> Result<String, DateError> {
        Ok(normalize_date_key(s)?.replace('-', ""))
    }

    /// Convert a "YYYYMMDD" key to "YYYY-MM-DD".
    pub fn from_compact_key(s: &str) -> Result<String, DateError> {
        let s = s.trim();
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError(format!("not a YYYYMMDD key: {s:?}")));
        }
        Ok(format!("{}-{}-{}", &s[0..4], &s[4..6], &s[6..8]))
    }

    /// Signed number of days from `from` to `to`.
    pub fn days_between(from: &NaiveDate, to: &NaiveDate) -> i64 {
        (*to - *from).num_days()
    }

}

/// Error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("Date error: {0}")]
    pub struct DateError(pub String);

}
