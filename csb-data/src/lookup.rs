//! Resolving an NDVI value for an arbitrary calendar date.
//!
//! Observed series are sparse (one composite every 8 or 16 days), so a
//! requested date is resolved by exact match, then by the nearest point in
//! a small window or by linear interpolation between the bracketing points.
//! Dates beyond the last observation may be filled by the forecast
//! extrapolator. Nothing here mutates its input; missing data is `None`.

use crate::forecast::{forecast, PATTERN_LENGTH};
use crate::round2;
use chrono::{Days, NaiveDate};
use csb_ndvi::time_series::{Provenance, TimeSeries, TimeSeriesPoint};
use csb_utils::dates::days_between;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Nearest-neighbour lookups only accept points strictly closer than this.
pub const NEAREST_WINDOW_DAYS: i64 = 7;

/// Forecasts are only produced up to this many days past the last observation.
pub const MAX_FORECAST_DAYS: i64 = 365;

/// An NDVI value together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub provenance: Provenance,
}

/// The first point dated exactly `date`.
pub fn find_exact<'a>(series: &'a TimeSeries, date: &NaiveDate) -> Option<&'a TimeSeriesPoint> {
    let points = series.points();
    let i = points.partition_point(|p| p.date < *date);
    points.get(i).filter(|p| p.date == *date)
}

/// Closest point strictly within `window_days` of `date`. On a tie the
/// earlier point wins.
pub fn nearest_within<'a>(
    series: &'a TimeSeries,
    date: &NaiveDate,
    window_days: i64,
) -> Option<&'a TimeSeriesPoint> {
    let mut best: Option<(&TimeSeriesPoint, i64)> = None;
    for point in series {
        let diff = days_between(date, &point.date).abs();
        if diff >= window_days {
            continue;
        }
        match best {
            Some((_, best_diff)) if best_diff <= diff => {}
            _ => best = Some((point, diff)),
        }
    }
    best.map(|(point, _)| point)
}

/// Exact value for `date`, or the unadjusted value of the nearest point
/// within [`NEAREST_WINDOW_DAYS`].
pub fn lookup(series: &TimeSeries, date: &NaiveDate) -> Option<f64> {
    lookup_resolved(series, date).map(|value| value.ndvi)
}

/// [`lookup`], tagged [`Provenance::Observed`] or [`Provenance::Nearest`].
/// The returned date is the requested one.
pub fn lookup_resolved(series: &TimeSeries, date: &NaiveDate) -> Option<ResolvedValue> {
    if let Some(point) = find_exact(series, date) {
        return Some(ResolvedValue {
            date: *date,
            ndvi: point.ndvi,
            provenance: Provenance::Observed,
        });
    }
    nearest_within(series, date, NEAREST_WINDOW_DAYS).map(|point| {
        debug!("Using {} for {}", point.date, date);
        ResolvedValue {
            date: *date,
            ndvi: point.ndvi,
            provenance: Provenance::Nearest,
        }
    })
}

/// Exact value for `date`, or the linear interpolation between the two
/// points bracketing it. Dates outside the observed range are `None`.
pub fn interpolate(series: &TimeSeries, date: &NaiveDate) -> Option<f64> {
    let points = series.points();
    let after = points.partition_point(|p| p.date <= *date);
    if after == 0 {
        return None;
    }
    let before = &points[after - 1];
    if before.date == *date {
        return find_exact(series, date).map(|p| p.ndvi);
    }
    let next = points.get(after)?;
    let span = days_between(&before.date, &next.date) as f64;
    let offset = days_between(&before.date, date) as f64;
    Some(before.ndvi + (next.ndvi - before.ndvi) * offset / span)
}

/// Resolve a value the way the map does: observed, then forecast for dates
/// after `today` within a year of the last observation, then interpolated
/// (rounded to two decimals like forecasts).
pub fn resolve<R: Rng>(
    series: &TimeSeries,
    date: &NaiveDate,
    today: &NaiveDate,
    rng: &mut R,
) -> Option<ResolvedValue> {
    if let Some(point) = find_exact(series, date) {
        return Some(ResolvedValue {
            date: *date,
            ndvi: point.ndvi,
            provenance: Provenance::Observed,
        });
    }

    if date > today {
        if let Some(value) = forecast_value(series, date, rng) {
            return Some(value);
        }
    }

    interpolate(series, date).map(|ndvi| ResolvedValue {
        date: *date,
        ndvi: round2(ndvi),
        provenance: Provenance::Interpolated,
    })
}

fn forecast_value<R: Rng>(
    series: &TimeSeries,
    date: &NaiveDate,
    rng: &mut R,
) -> Option<ResolvedValue> {
    let last = series.last()?;
    let days = days_between(&last.date, date);
    if !(1..=MAX_FORECAST_DAYS).contains(&days) {
        return None;
    }
    let start = last.date.checked_add_days(Days::new(1))?;
    debug!("Forecasting {} days past {}", days, last.date);
    forecast(series.tail(PATTERN_LENGTH), start, days as usize, rng)
        .last()
        .filter(|point| point.date == *date)
        .map(|point| ResolvedValue {
            date: point.date,
            ndvi: point.ndvi,
            provenance: Provenance::Forecast,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(date: NaiveDate, ndvi: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date,
            ndvi,
            ebi: 0.0,
            cloud_cover: 0.0,
        }
    }

    fn two_point_series() -> TimeSeries {
        TimeSeries::new(vec![
            point(ymd(2017, 3, 1), 0.10),
            point(ymd(2017, 3, 15), 0.22),
        ])
    }

    #[test]
    fn test_find_exact() {
        let series = two_point_series();
        assert_eq!(find_exact(&series, &ymd(2017, 3, 15)).unwrap().ndvi, 0.22);
        assert!(find_exact(&series, &ymd(2017, 3, 14)).is_none());
        assert!(find_exact(&TimeSeries::default(), &ymd(2017, 3, 15)).is_none());
    }

    #[test]
    fn test_lookup_nearest_window() {
        let series = two_point_series();
        assert_eq!(lookup(&series, &ymd(2017, 3, 1)), Some(0.10));
        // 3 days from 03-01 and 11 days from 03-15
        assert_eq!(lookup(&series, &ymd(2017, 3, 4)), Some(0.10));
        // 6 days from 03-15 is inside the window
        assert_eq!(lookup(&series, &ymd(2017, 3, 21)), Some(0.22));
        // exactly 7 days away is outside
        assert_eq!(lookup(&series, &ymd(2017, 3, 22)), None);
        assert_eq!(lookup(&series, &ymd(2017, 2, 22)), None);
    }

    #[test]
    fn test_lookup_resolved_provenance() {
        let series = two_point_series();
        let exact = lookup_resolved(&series, &ymd(2017, 3, 15)).unwrap();
        assert_eq!(exact.provenance, Provenance::Observed);
        let near = lookup_resolved(&series, &ymd(2017, 3, 18)).unwrap();
        assert_eq!(near.provenance, Provenance::Nearest);
        assert_eq!(near.date, ymd(2017, 3, 18));
        assert_eq!(near.ndvi, 0.22);
        assert!(lookup_resolved(&series, &ymd(2017, 3, 22)).is_none());
    }

    #[test]
    fn test_lookup_tie_prefers_earlier() {
        let series = TimeSeries::new(vec![
            point(ymd(2017, 3, 1), 0.10),
            point(ymd(2017, 3, 9), 0.30),
        ]);
        assert_eq!(lookup(&series, &ymd(2017, 3, 5)), Some(0.10));
    }

    #[test]
    fn test_interpolate_midpoint() {
        let series = two_point_series();
        let value = interpolate(&series, &ymd(2017, 3, 8)).unwrap();
        assert!((value - 0.16).abs() < 1e-9);
    }

    #[test]
    fn test_interpolate_bounds() {
        let series = two_point_series();
        assert_eq!(interpolate(&series, &ymd(2017, 3, 15)), Some(0.22));
        assert_eq!(interpolate(&series, &ymd(2017, 3, 1)), Some(0.10));
        assert_eq!(interpolate(&series, &ymd(2017, 2, 28)), None);
        assert_eq!(interpolate(&series, &ymd(2017, 3, 16)), None);
        assert_eq!(interpolate(&TimeSeries::default(), &ymd(2017, 3, 8)), None);
        for day in 1..=15 {
            let value = interpolate(&series, &ymd(2017, 3, day)).unwrap();
            assert!((0.10..=0.22).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn test_interpolate_does_not_mutate() {
        let series = two_point_series();
        let before = series.clone();
        let _ = interpolate(&series, &ymd(2017, 3, 8));
        let _ = lookup(&series, &ymd(2017, 3, 8));
        assert_eq!(series, before);
    }

    #[test]
    fn test_resolve_observed_and_interpolated() {
        let series = two_point_series();
        let today = ymd(2025, 1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let observed = resolve(&series, &ymd(2017, 3, 15), &today, &mut rng).unwrap();
        assert_eq!(observed.provenance, Provenance::Observed);
        let interpolated = resolve(&series, &ymd(2017, 3, 8), &today, &mut rng).unwrap();
        assert_eq!(interpolated.provenance, Provenance::Interpolated);
        assert!(resolve(&series, &ymd(2017, 4, 1), &today, &mut rng).is_none());
    }

    #[test]
    fn test_resolve_rounds_interpolated() {
        let series = two_point_series();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        // 0.10 + 0.12 * 3 / 14 = 0.1257..
        assert!((interpolate(&series, &ymd(2017, 3, 4)).unwrap() - 0.125714).abs() < 1e-6);
        let value = resolve(&series, &ymd(2017, 3, 4), &ymd(2025, 1, 1), &mut rng).unwrap();
        assert_eq!(value.ndvi, 0.13);
    }

    #[test]
    fn test_resolve_forecast_window() {
        let series = two_point_series();
        let today = ymd(2017, 3, 15);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let target = ymd(2017, 4, 1);
        let value = resolve(&series, &target, &today, &mut rng).unwrap();
        assert_eq!(value.provenance, Provenance::Forecast);
        assert_eq!(value.date, target);
        assert!((0.05..=0.9).contains(&value.ndvi));

        // more than a year past the last observation
        assert!(resolve(&series, &ymd(2018, 3, 16), &today, &mut rng).is_none());
    }
}
