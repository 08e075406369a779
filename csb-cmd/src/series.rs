//! Observed series and synthetic forecasts for one location.

use crate::Options;
use chrono::Days;
use csb_data::forecast::{extend_year, forecast, PATTERN_LENGTH};
use csb_data::phenology::{days_advance_warning, detect_bloom_alert, filter_by_date_range, peak_bloom};
use csb_ndvi::time_series::ForecastPoint;
use csb_utils::dates::parse_date;
use log::{info, warn};

pub fn run_series(
    options: &Options,
    location: &str,
    start: Option<&str>,
    end: Option<&str>,
    alert_threshold: f64,
) -> anyhow::Result<()> {
    let store = options.store()?;
    store.locations().require(location)?;
    let mut series = store.load(location);
    let Some((first, last)) = series.date_range() else {
        warn!("No NDVI data for {}", location);
        return Ok(());
    };

    if start.is_some() || end.is_some() {
        let start = start.map(parse_date).transpose()?.unwrap_or(first);
        let end = end.map(parse_date).transpose()?.unwrap_or(last);
        series = filter_by_date_range(&series, &start, &end);
        info!("{} points between {} and {}", series.len(), start, end);
    }

    println!("date,ndvi,ebi,cloudCover");
    for point in &series {
        println!("{},{:.3},{:.3},{:.1}", point.date, point.ndvi, point.ebi, point.cloud_cover);
    }

    let alert = detect_bloom_alert(&series, alert_threshold);
    let peak = peak_bloom(&series);
    match alert {
        Some(alert) => eprintln!("bloom alert: {} (NDVI >= {})", alert, alert_threshold),
        None => eprintln!("bloom alert: none (NDVI never reached {})", alert_threshold),
    }
    if let Some(peak) = peak {
        eprintln!("peak bloom: {} (NDVI {:.3})", peak.date, peak.ndvi);
        if let Some(alert) = alert {
            eprintln!(
                "advance warning: {} days",
                days_advance_warning(&alert, &peak.date)
            );
        }
    }
    Ok(())
}

pub fn run_forecast(
    options: &Options,
    location: &str,
    days: usize,
    target_year: Option<i32>,
) -> anyhow::Result<()> {
    let store = options.store()?;
    store.locations().require(location)?;
    let series = store.load(location);

    let points: Vec<ForecastPoint> = match target_year {
        Some(year) => extend_year(&series, year),
        None => {
            let Some(last) = series.last() else {
                warn!("No NDVI data to forecast from for {}", location);
                return Ok(());
            };
            let start = last
                .date
                .checked_add_days(Days::new(1))
                .ok_or_else(|| anyhow::anyhow!("no date after {}", last.date))?;
            let mut rng = options.rng();
            forecast(series.tail(PATTERN_LENGTH), start, days, &mut rng).collect()
        }
    };

    println!("date,ndvi");
    for point in &points {
        println!("{},{:.2}", point.date, point.ndvi);
    }
    info!("{} forecast points for {}", points.len(), location);
    Ok(())
}
