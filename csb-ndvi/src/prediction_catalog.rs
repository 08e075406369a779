//! Precomputed seasonal bloom predictions, one entry per location.

use crate::error::BloomError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedded prediction catalog for the upcoming season.
pub static PREDICTIONS_JSON: &str = include_str!("../../fixtures/predictions.json");

/// Climate inputs the prediction was made from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFeatures {
    #[serde(rename = "winterPrecipitation_mm")]
    pub winter_precipitation_mm: Option<f64>,
    #[serde(rename = "winterAvgTemperature_C")]
    pub winter_avg_temperature_c: Option<f64>,
}

/// A predicted NDVI value. Entries outside the bloom window are flagged
/// `off_season` and are not predictions proper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedNdvi {
    pub date: NaiveDate,
    pub ndvi: f64,
    #[serde(default)]
    pub predicted: bool,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub off_season: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPrediction {
    pub predicted_peak_date: NaiveDate,
    pub predicted_start_date: NaiveDate,
    pub predicted_end_date: NaiveDate,
    #[serde(rename = "predictedPeakNDVI")]
    pub predicted_peak_ndvi: f64,
    #[serde(default)]
    pub prediction_confidence: Option<f64>,
    #[serde(default)]
    pub model_accuracy: Option<f64>,
    #[serde(default)]
    pub input_features: Option<InputFeatures>,
    #[serde(default)]
    pub ndvi_data: Vec<PredictedNdvi>,
}

impl LocationPrediction {
    /// Whether `date` lies in the predicted bloom window, inclusive.
    pub fn is_in_bloom_window(&self, date: &NaiveDate) -> bool {
        self.predicted_start_date <= *date && *date <= self.predicted_end_date
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionCatalog(HashMap<String, LocationPrediction>);

impl PredictionCatalog {
    pub fn from_json(json: &str) -> Result<PredictionCatalog, BloomError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn embedded() -> Result<PredictionCatalog, BloomError> {
        PredictionCatalog::from_json(PREDICTIONS_JSON)
    }

    pub fn for_location(&self, location_id: &str) -> Option<&LocationPrediction> {
        self.0.get(location_id)
    }

    pub fn ndvi_for_date(&self, location_id: &str, date: &NaiveDate) -> Option<&PredictedNdvi> {
        self.series(location_id).iter().find(|d| d.date == *date)
    }

    /// The full predicted series, off-season entries included.
    pub fn series(&self, location_id: &str) -> &[PredictedNdvi] {
        self.for_location(location_id)
            .map(|p| p.ndvi_data.as_slice())
            .unwrap_or_default()
    }

    /// Only the entries inside the bloom prediction period.
    pub fn bloom_series(&self, location_id: &str) -> Vec<&PredictedNdvi> {
        self.series(location_id)
            .iter()
            .filter(|d| d.predicted)
            .collect()
    }

    pub fn has_prediction_for_date(&self, location_id: &str, date: &NaiveDate) -> bool {
        self.ndvi_for_date(location_id, date)
            .is_some_and(|d| d.predicted)
    }

    pub fn is_in_bloom_window(&self, location_id: &str, date: &NaiveDate) -> bool {
        self.for_location(location_id)
            .is_some_and(|p| p.is_in_bloom_window(date))
    }
}

#[cfg(test)]
mod tests {
    use super::PredictionCatalog;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_embedded_catalog() {
        let catalog = PredictionCatalog::embedded().unwrap();
        let anza = catalog.for_location("anza-borrego").unwrap();
        assert_eq!(anza.predicted_peak_date, ymd(2026, 3, 24));
        assert_eq!(anza.predicted_peak_ndvi, 0.24);
        let features = anza.input_features.as_ref().unwrap();
        assert_eq!(features.winter_precipitation_mm, Some(118.4));
        assert_eq!(catalog.series("anza-borrego").len(), 5);
        assert_eq!(catalog.bloom_series("anza-borrego").len(), 3);
    }

    #[test]
    fn test_date_queries() {
        let catalog = PredictionCatalog::embedded().unwrap();
        assert!(catalog.has_prediction_for_date("anza-borrego", &ymd(2026, 3, 24)));
        assert!(!catalog.has_prediction_for_date("anza-borrego", &ymd(2026, 1, 15)));
        assert!(!catalog.has_prediction_for_date("anza-borrego", &ymd(2026, 1, 16)));
        let off_season = catalog.ndvi_for_date("anza-borrego", &ymd(2026, 6, 15)).unwrap();
        assert!(off_season.off_season);
        assert!(catalog.is_in_bloom_window("carrizo-plain", &ymd(2026, 5, 10)));
        assert!(!catalog.is_in_bloom_window("carrizo-plain", &ymd(2026, 5, 11)));
    }

    #[test]
    fn test_unknown_location() {
        let catalog = PredictionCatalog::embedded().unwrap();
        assert!(catalog.for_location("death-valley").is_none());
        assert!(catalog.series("death-valley").is_empty());
        assert!(!catalog.is_in_bloom_window("death-valley", &ymd(2026, 3, 1)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(PredictionCatalog::from_json("{\"x\": 1}").is_err());
        assert!(PredictionCatalog::from_json("[").is_err());
    }
}
