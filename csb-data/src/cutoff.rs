//! Choosing between observed and predicted data around the cutoff date.
//!
//! Dates on or before `today` are historical; anything later is served from
//! model forecasts. `today` is always passed in by the caller.

use chrono::NaiveDate;
use csb_ndvi::forecast_file::ForecastRecord;
use csb_ndvi::time_series::{TimeSeries, TimeSeriesPoint};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message reported when a forecast date has nothing to show.
pub const NO_FORECAST_DATA: &str = "No forecast data available";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum DataSource {
    Historical,
    Forecast,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Historical => f.write_str("historical"),
            DataSource::Forecast => f.write_str("forecast"),
        }
    }
}

pub fn source_for(date: &NaiveDate, today: &NaiveDate) -> DataSource {
    if date <= today {
        DataSource::Historical
    } else {
        DataSource::Forecast
    }
}

pub fn is_historical(date: &NaiveDate, today: &NaiveDate) -> bool {
    source_for(date, today) == DataSource::Historical
}

/// The series a view should draw for a selected date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergedData<'a> {
    Historical(&'a TimeSeries),
    Forecast(&'a [ForecastRecord]),
    /// A forecast date was selected but there are no forecasts.
    ForecastUnavailable,
}

impl MergedData<'_> {
    pub fn source(&self) -> DataSource {
        match self {
            MergedData::Historical(_) => DataSource::Historical,
            MergedData::Forecast(_) | MergedData::ForecastUnavailable => DataSource::Forecast,
        }
    }

    pub fn error(&self) -> Option<&'static str> {
        match self {
            MergedData::ForecastUnavailable => Some(NO_FORECAST_DATA),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            MergedData::Historical(series) => series.len(),
            MergedData::Forecast(records) => records.len(),
            MergedData::ForecastUnavailable => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn merge_for_date<'a>(
    historical: &'a TimeSeries,
    forecast: &'a [ForecastRecord],
    date: &NaiveDate,
    today: &NaiveDate,
) -> MergedData<'a> {
    match source_for(date, today) {
        DataSource::Historical => MergedData::Historical(historical),
        DataSource::Forecast if forecast.is_empty() => {
            warn!("Forecast date {} selected but no forecast data available", date);
            MergedData::ForecastUnavailable
        }
        DataSource::Forecast => MergedData::Forecast(forecast),
    }
}

/// The record for exactly `date`, taken from whichever side of the cutoff
/// the date falls on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatedRecord {
    Historical(Option<TimeSeriesPoint>),
    Prediction(Option<ForecastRecord>),
}

impl DatedRecord {
    pub fn is_prediction(&self) -> bool {
        matches!(self, DatedRecord::Prediction(_))
    }

    pub fn ndvi(&self) -> Option<f64> {
        match self {
            DatedRecord::Historical(point) => point.as_ref().map(|p| p.ndvi),
            DatedRecord::Prediction(record) => record.as_ref().map(|r| r.ndvi),
        }
    }
}

pub fn record_for_date(
    historical: &TimeSeries,
    forecast: &[ForecastRecord],
    date: &NaiveDate,
    today: &NaiveDate,
) -> DatedRecord {
    match source_for(date, today) {
        DataSource::Historical => {
            DatedRecord::Historical(historical.iter().find(|p| p.date == *date).cloned())
        }
        DataSource::Forecast => {
            DatedRecord::Prediction(forecast.iter().find(|r| r.date == *date).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csb_ndvi::forecast_file::parse_forecast_csv;

    static FORECAST_CSV: &str = include_str!("../../fixtures/data/anzaborrego_forecast.csv");
    static NDVI_CSV: &str = include_str!("../../fixtures/data/anzaborrego.csv");

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_source_for() {
        let today = ymd(2025, 10, 4);
        assert_eq!(source_for(&today, &today), DataSource::Historical);
        assert_eq!(source_for(&ymd(2025, 10, 5), &today), DataSource::Forecast);
        assert!(is_historical(&ymd(2017, 3, 17), &today));
        assert_eq!(DataSource::Forecast.to_string(), "forecast");
    }

    #[test]
    fn test_merge_for_date() {
        let historical = TimeSeries::parse_csv(NDVI_CSV).unwrap();
        let forecast = parse_forecast_csv(FORECAST_CSV).unwrap();
        let today = ymd(2025, 10, 4);

        let merged = merge_for_date(&historical, &forecast, &ymd(2017, 3, 17), &today);
        assert_eq!(merged.source(), DataSource::Historical);
        assert_eq!(merged.len(), historical.len());
        assert!(merged.error().is_none());

        let merged = merge_for_date(&historical, &forecast, &ymd(2026, 3, 1), &today);
        assert_eq!(merged, MergedData::Forecast(&forecast));

        let merged = merge_for_date(&historical, &[], &ymd(2026, 3, 1), &today);
        assert_eq!(merged.source(), DataSource::Forecast);
        assert!(merged.is_empty());
        assert_eq!(merged.error(), Some(NO_FORECAST_DATA));
    }

    #[test]
    fn test_record_for_date() {
        let historical = TimeSeries::parse_csv(NDVI_CSV).unwrap();
        let forecast = parse_forecast_csv(FORECAST_CSV).unwrap();
        let today = ymd(2025, 10, 4);

        let record = record_for_date(&historical, &forecast, &ymd(2017, 3, 17), &today);
        assert!(!record.is_prediction());
        assert_eq!(record.ndvi(), Some(0.258));

        let record = record_for_date(&historical, &forecast, &ymd(2026, 2, 1), &today);
        assert!(record.is_prediction());
        assert_eq!(record.ndvi(), Some(0.118));

        // predictions are never consulted for past dates
        let record = record_for_date(&historical, &forecast, &ymd(2026, 2, 1), &ymd(2026, 6, 1));
        assert_eq!(record, DatedRecord::Historical(None));
    }
}
