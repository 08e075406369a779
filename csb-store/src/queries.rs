//! Date queries over cached series.

use crate::models::{DateSpan, LocationSummary};
use crate::source::SeriesSource;
use crate::SeriesStore;
use chrono::NaiveDate;
use csb_data::cutoff::{record_for_date, DatedRecord};
use csb_data::lookup::{find_exact, lookup_resolved, ResolvedValue};
use csb_ndvi::time_series::TimeSeriesPoint;
use std::collections::BTreeSet;

impl<S: SeriesSource> SeriesStore<S> {
    /// Observed dates for `id`, ascending.
    pub fn dates(&self, id: &str) -> Vec<NaiveDate> {
        self.load(id).dates()
    }

    pub fn date_range(&self, id: &str) -> Option<DateSpan> {
        self.load(id)
            .date_range()
            .map(|(start, end)| DateSpan { start, end })
    }

    /// Every date with observed or forecast data at any enabled location,
    /// ascending and without duplicates.
    pub fn all_available_dates(&self) -> Vec<NaiveDate> {
        let mut dates = BTreeSet::new();
        for location in self.locations.enabled() {
            dates.extend(self.load(&location.id).iter().map(|p| p.date));
            dates.extend(
                self.load_forecast_records(&location.id)
                    .iter()
                    .map(|r| r.date),
            );
        }
        log::info!("{} available dates across locations", dates.len());
        dates.into_iter().collect()
    }

    /// The observation dated exactly `date`.
    pub fn point_for_date(&self, id: &str, date: &NaiveDate) -> Option<TimeSeriesPoint> {
        find_exact(&self.load(id), date).cloned()
    }

    /// NDVI on `date`, or from the nearest observation within a week.
    pub fn ndvi_for_date(&self, id: &str, date: &NaiveDate) -> Option<f64> {
        self.resolved_for_date(id, date).map(|value| value.ndvi)
    }

    /// [`Self::ndvi_for_date`] with its provenance.
    pub fn resolved_for_date(&self, id: &str, date: &NaiveDate) -> Option<ResolvedValue> {
        lookup_resolved(&self.load(id), date)
    }

    /// Observed data on or before `today`, model forecasts after it.
    pub fn data_for_date(&self, id: &str, date: &NaiveDate, today: &NaiveDate) -> DatedRecord {
        let historical = self.load(id);
        let forecast = self.load_forecast_records(id);
        record_for_date(&historical, &forecast, date, today)
    }

    pub fn summaries(&self) -> Vec<LocationSummary> {
        self.locations
            .iter()
            .map(|location| {
                let series = self.load(&location.id);
                LocationSummary {
                    id: location.id.clone(),
                    name: location.name.clone(),
                    enabled: location.is_enabled(),
                    disabled_reason: location.disabled_reason.clone(),
                    points: series.len(),
                    forecast_records: self.load_forecast_records(&location.id).len(),
                    span: series
                        .date_range()
                        .map(|(start, end)| DateSpan { start, end }),
                }
            })
            .collect()
    }
}
