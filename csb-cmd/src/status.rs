//! Bloom status of every location on one date.

use crate::Options;
use chrono::NaiveDate;
use csb_data::classify::{classify_location, BloomStatus};
use csb_data::cutoff::DatedRecord;
use csb_data::lookup::resolve;
use csb_ndvi::location::LocationConfig;
use csb_ndvi::time_series::Provenance;
use csb_store::{SeriesSource, SeriesStore};
use csb_utils::dates::parse_date;
use log::info;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusRow {
    pub id: String,
    pub name: String,
    pub ndvi: Option<f64>,
    pub provenance: Option<Provenance>,
    pub status: BloomStatus,
    pub opacity: f64,
    pub intensity: f64,
}

/// Classify `location` on `date`. Model forecast rows take precedence over
/// synthetic extrapolation for dates after `today`.
pub fn status_row<S: SeriesSource, R: Rng>(
    store: &SeriesStore<S>,
    location: &LocationConfig,
    date: &NaiveDate,
    today: &NaiveDate,
    rng: &mut R,
) -> StatusRow {
    let (ndvi, provenance) = match store.data_for_date(&location.id, date, today) {
        DatedRecord::Prediction(Some(record)) => (Some(record.ndvi), Some(Provenance::Forecast)),
        _ => match resolve(&store.load(&location.id), date, today, rng) {
            Some(value) => (Some(value.ndvi), Some(value.provenance)),
            None => (None, None),
        },
    };
    // no data draws nothing
    let state = classify_location(ndvi.unwrap_or(0.0), date, location);
    StatusRow {
        id: location.id.clone(),
        name: location.name.clone(),
        ndvi,
        provenance,
        status: state.status,
        opacity: state.opacity,
        intensity: state.intensity,
    }
}

pub fn run_status(
    options: &Options,
    date: &str,
    location: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let date = parse_date(date)?;
    let today = options.today()?;
    let store = options.store()?;
    let mut rng = options.rng();

    let locations = match location {
        Some(id) => vec![store.locations().require(id)?],
        None => store.locations().enabled().collect(),
    };
    info!("Classifying {} locations on {}", locations.len(), date);

    let rows: Vec<StatusRow> = locations
        .into_iter()
        .map(|location| status_row(&store, location, &date, &today, &mut rng))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    println!(
        "{:<16} {:>6} {:<13} {:<14} {:>7} {:>9}",
        "location", "ndvi", "source", "status", "opacity", "intensity"
    );
    for row in &rows {
        let ndvi = row.ndvi.map_or("-".to_string(), |v| format!("{:.3}", v));
        let source = row.provenance.map_or("-".to_string(), |p| format!("{:?}", p));
        println!(
            "{:<16} {:>6} {:<13} {:<14} {:>7.2} {:>9.2}",
            row.id,
            ndvi,
            source,
            format!("{} {}", row.status.tag(), row.status.label()),
            row.opacity,
            row.intensity
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use csb_data::forecast::seeded_rng;
    use csb_ndvi::location::LocationTable;
    use csb_store::source::MemorySource;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_rows() {
        let store = SeriesStore::new(MemorySource::embedded(), LocationTable::embedded().unwrap());
        let today = ymd(2025, 10, 4);
        let mut rng = seeded_rng(1);

        let anza = store.locations().require("anza-borrego").unwrap().clone();
        let row = status_row(&store, &anza, &ymd(2017, 3, 17), &today, &mut rng);
        assert_eq!(row.ndvi, Some(0.258));
        assert_eq!(row.provenance, Some(Provenance::Observed));
        assert_eq!(row.status, BloomStatus::PeakBloom);

        // model forecast row
        let row = status_row(&store, &anza, &ymd(2026, 3, 29), &today, &mut rng);
        assert_eq!(row.provenance, Some(Provenance::Forecast));

        let death_valley = store.locations().require("death-valley").unwrap().clone();
        let row = status_row(&store, &death_valley, &ymd(2017, 3, 17), &today, &mut rng);
        assert_eq!(row.ndvi, None);
        assert_eq!(row.opacity, 0.0);
    }
}
