//! Model forecast files.
//!
//! A forecast file carries one row per predicted date:
//! `date,GDD,ndvi,precipitation_mm,soil_moisture,bloom_pred,bloom_prob`.

use crate::error::BloomError;
use crate::time_series::parse_f64_or_zero;
use chrono::NaiveDate;
use csb_utils::dates::parse_date;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

/// One row of a forecast file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    /// Accumulated growing degree days
    pub gdd_day: i32,
    pub ndvi: f64,
    pub precipitation_mm: f64,
    pub soil_moisture: f64,
    /// 1 when the model predicts a bloom on this date
    pub bloom_pred: i32,
    /// Model bloom probability, 0..=1
    pub bloom_prob: f64,
}

impl ForecastRecord {
    pub fn is_bloom_predicted(&self) -> bool {
        self.bloom_pred != 0
    }
}

/// Integer fields keep only the whole part, and anything unparseable is 0.
fn parse_i32_or_zero(field: Option<&str>) -> i32 {
    parse_f64_or_zero(field).trunc() as i32
}

impl TryFrom<StringRecord> for ForecastRecord {
    type Error = BloomError;

    fn try_from(value: StringRecord) -> Result<Self, Self::Error> {
        let date_field = value.get(0).unwrap_or_default();
        let date = parse_date(date_field)
            .map_err(|e| BloomError::DateParse(format!("{date_field:?}: {e}")))?;
        Ok(ForecastRecord {
            date,
            gdd_day: parse_i32_or_zero(value.get(1)),
            ndvi: parse_f64_or_zero(value.get(2)),
            precipitation_mm: parse_f64_or_zero(value.get(3)),
            soil_moisture: parse_f64_or_zero(value.get(4)),
            bloom_pred: parse_i32_or_zero(value.get(5)),
            bloom_prob: parse_f64_or_zero(value.get(6)),
        })
    }
}

/// Parse a forecast CSV body (with header line), sorted by date.
///
/// Rows without a usable date are dropped; numeric fields default to 0.
pub fn parse_forecast_csv(csv_object: &str) -> Result<Vec<ForecastRecord>, BloomError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_object.as_bytes());
    let mut records = Vec::new();
    for row in rdr.records() {
        if let Ok(record) = ForecastRecord::try_from(row?) {
            records.push(record);
        }
    }
    records.sort_by_key(|r| r.date);
    Ok(records)
}
