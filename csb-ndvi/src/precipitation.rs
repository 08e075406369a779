//! Daily precipitation and climate readings from NASA POWER.
//!
//! POWER responses are nested JSON keyed by parameter name and then by a
//! compact `YYYYMMDD` date:
//!
//! ```text
//! { "properties": { "parameter": { "PRECTOTCORR": { "20161215": 10.0, ... } } } }
//! ```
//!
//! Parsing never fails loudly: any structural anomaly yields `None`.

use chrono::NaiveDate;
use csb_utils::dates::parse_date_compact;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

/// POWER parameter name for bias-corrected total precipitation (mm/day).
pub const PRECIPITATION_PARAMETER: &str = "PRECTOTCORR";

/// POWER parameter name for temperature at 2 metres (°C).
pub const TEMPERATURE_PARAMETER: &str = "T2M";

/// POWER marks missing days with this fill value.
pub const POWER_FILL_VALUE: f64 = -999.0;

fn is_missing(value: f64) -> bool {
    !value.is_finite() || value <= POWER_FILL_VALUE
}

/// Daily precipitation in millimetres for one location, ordered by date.
///
/// The mapping is sparse: days absent from the source are absent here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationSeries(BTreeMap<NaiveDate, f64>);

impl PrecipitationSeries {
    pub fn new() -> PrecipitationSeries {
        PrecipitationSeries(BTreeMap::new())
    }

    /// Build from compact `YYYYMMDD` keys. Unparseable keys, non-finite
    /// values and POWER fill values are skipped.
    pub fn from_compact_map<I, K>(entries: I) -> PrecipitationSeries
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut series = PrecipitationSeries::new();
        for (key, value) in entries {
            let key = key.as_ref();
            match parse_date_compact(key) {
                Ok(date) if !is_missing(value) => series.insert(date, value),
                Ok(_) => debug!("skipping missing precipitation value for {}", key),
                Err(_) => warn!("skipping precipitation key {:?}", key),
            }
        }
        series
    }

    pub fn insert(&mut self, date: NaiveDate, millimetres: f64) {
        self.0.insert(date, millimetres);
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.0.get(date).copied()
    }

    /// Readings within `range`, in date order.
    pub fn range(&self, range: RangeInclusive<NaiveDate>) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.0.range(range)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One day of combined temperature and precipitation readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateDay {
    pub date: NaiveDate,
    pub temperature_c: f64,
    pub precipitation_mm: f64,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: HashMap<String, HashMap<String, Option<f64>>>,
}

fn parse_parameters(body: &str) -> Option<HashMap<String, HashMap<String, Option<f64>>>> {
    match serde_json::from_str::<PowerResponse>(body) {
        Ok(response) => Some(response.properties.parameter),
        Err(e) => {
            warn!("Invalid response format from NASA POWER API: {}", e);
            None
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Extract the precipitation series from a POWER response body.
pub fn parse_precipitation_response(body: &str) -> Option<PrecipitationSeries> {
    let mut parameters = parse_parameters(body)?;
    let Some(values) = parameters.remove(PRECIPITATION_PARAMETER) else {
        warn!("POWER response has no {} parameter", PRECIPITATION_PARAMETER);
        return None;
    };
    let entries = values
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)));
    Some(PrecipitationSeries::from_compact_map(entries))
}

/// Extract combined temperature and precipitation days from a POWER
/// response body. Days missing either reading are skipped.
pub fn parse_climate_response(body: &str) -> Option<Vec<ClimateDay>> {
    let parameters = parse_parameters(body)?;
    let (Some(temperatures), Some(precipitation)) = (
        parameters.get(TEMPERATURE_PARAMETER),
        parameters.get(PRECIPITATION_PARAMETER),
    ) else {
        warn!("Missing temperature or precipitation data in API response");
        return None;
    };
    let mut days: Vec<ClimateDay> = temperatures
        .iter()
        .filter_map(|(key, temperature)| {
            let date = parse_date_compact(key).ok()?;
            let temperature = (*temperature).filter(|t| !is_missing(*t))?;
            let precipitation = precipitation
                .get(key)
                .copied()
                .flatten()
                .filter(|p| !is_missing(*p))?;
            Some(ClimateDay {
                date,
                temperature_c: round_to(temperature, 1),
                precipitation_mm: round_to(precipitation, 2),
            })
        })
        .collect();
    days.sort_by_key(|d| d.date);
    Some(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_compact_map() {
        let series = PrecipitationSeries::from_compact_map([
            ("20161215", 10.0),
            ("20170110", 5.0),
            ("2017011", 3.0),
            ("20170111", -999.0),
            ("20170112", f64::NAN),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&ymd(2016, 12, 15)), Some(10.0));
        assert_eq!(series.get(&ymd(2017, 1, 11)), None);
    }

    #[test]
    fn test_range_is_ordered() {
        let series = PrecipitationSeries::from_compact_map([
            ("20170301", 1.0),
            ("20161201", 2.0),
            ("20170101", 3.0),
        ]);
        let dates: Vec<NaiveDate> = series
            .range(ymd(2016, 12, 1)..=ymd(2017, 2, 28))
            .map(|(d, _)| *d)
            .collect();
        assert_eq!(dates, vec![ymd(2016, 12, 1), ymd(2017, 1, 1)]);
    }

    #[test]
    fn test_parse_precipitation_response() {
        let body = r#"{
            "type": "Feature",
            "properties": {
                "parameter": {
                    "PRECTOTCORR": { "20161215": 10.0, "20170110": 5.0, "20170111": -999.0, "20170112": null }
                }
            }
        }"#;
        let series = parse_precipitation_response(body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&ymd(2017, 1, 10)), Some(5.0));
    }

    #[test]
    fn test_parse_precipitation_response_degrades_to_none() {
        assert!(parse_precipitation_response("not json").is_none());
        assert!(parse_precipitation_response(r#"{"properties": {}}"#).is_none());
        assert!(
            parse_precipitation_response(r#"{"properties": {"parameter": {"T2M": {}}}}"#).is_none()
        );
    }

    #[test]
    fn test_parse_climate_response() {
        let body = r#"{
            "properties": {
                "parameter": {
                    "T2M": { "20170302": 18.26, "20170301": 17.04, "20170303": 19.0 },
                    "PRECTOTCORR": { "20170301": 0.123, "20170302": 2.0 }
                }
            }
        }"#;
        let days = parse_climate_response(body).unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, ymd(2017, 3, 1));
        assert_eq!(days[0].temperature_c, 17.0);
        assert_eq!(days[0].precipitation_mm, 0.12);
        assert_eq!(days[1].temperature_c, 18.3);
    }

    #[test]
    fn test_parse_climate_response_requires_both_parameters() {
        let body = r#"{"properties": {"parameter": {"T2M": {"20170301": 17.0}}}}"#;
        assert!(parse_climate_response(body).is_none());
    }
}
