//! Read-through loading of observed series and forecast records.

use crate::source::SeriesSource;
use crate::SeriesStore;
use csb_ndvi::forecast_file::{parse_forecast_csv, ForecastRecord};
use csb_ndvi::time_series::TimeSeries;
use log::{info, warn};

impl<S: SeriesSource> SeriesStore<S> {
    /// Observed series for location `id`, read from the source on first use.
    pub fn load(&self, id: &str) -> TimeSeries {
        if let Some(series) = self.series.borrow().get(id) {
            return series.clone();
        }
        let Some(file_name) = self.data_file(id) else {
            return TimeSeries::default();
        };
        let series = match self.source.read(&file_name) {
            Ok(body) => match TimeSeries::parse_csv(&body) {
                Ok(series) => series,
                Err(e) => {
                    warn!("Failed to parse {} for {}: {}", file_name, id, e);
                    return TimeSeries::default();
                }
            },
            Err(e) => {
                warn!("Failed to load data for {}: {:#}", id, e);
                return TimeSeries::default();
            }
        };
        if series.is_empty() {
            warn!("No valid data found for {}", id);
            return series;
        }
        info!("Loaded {} data points for {}", series.len(), id);
        self.series
            .borrow_mut()
            .insert(id.to_string(), series.clone());
        series
    }

    /// Model forecast rows for location `id`. Locations without a forecast
    /// file have none.
    pub fn load_forecast_records(&self, id: &str) -> Vec<ForecastRecord> {
        if let Some(records) = self.forecasts.borrow().get(id) {
            return records.clone();
        }
        let Some(file_name) = self
            .locations
            .get(id)
            .and_then(|location| location.forecast_file.clone())
        else {
            return Vec::new();
        };
        let records = match self
            .source
            .read(&file_name)
            .and_then(|body| Ok(parse_forecast_csv(&body)?))
        {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load forecast data for {}: {:#}", id, e);
                return Vec::new();
            }
        };
        if records.is_empty() {
            warn!("No valid forecast rows found for {}", id);
            return records;
        }
        info!("Loaded {} forecast records for {}", records.len(), id);
        self.forecasts
            .borrow_mut()
            .insert(id.to_string(), records.clone());
        records
    }

    /// Drop both cached series for `id`.
    pub fn invalidate(&self, id: &str) {
        self.series.borrow_mut().remove(id);
        self.forecasts.borrow_mut().remove(id);
    }

    pub fn clear(&self) {
        self.series.borrow_mut().clear();
        self.forecasts.borrow_mut().clear();
    }

    fn data_file(&self, id: &str) -> Option<String> {
        let Some(location) = self.locations.get(id) else {
            warn!("No configuration found for location: {}", id);
            return None;
        };
        if location.data_file.is_none() {
            warn!("No data file configured for location: {}", id);
        }
        location.data_file.clone()
    }
}
