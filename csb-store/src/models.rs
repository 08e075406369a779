//! Query result structs. All derive `Serialize` so they can be printed as
//! JSON by the command layer.

use chrono::NaiveDate;
use serde::Serialize;

/// First and last observed dates of a series.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One row of the location overview.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationSummary {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    /// Why the location is disabled, if it is.
    pub disabled_reason: Option<String>,
    pub points: usize,
    pub forecast_records: usize,
    pub span: Option<DateSpan>,
}
