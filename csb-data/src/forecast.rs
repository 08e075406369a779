//! Synthetic NDVI extrapolation beyond the observed record.
//!
//! The forecast repeats the trailing pattern of the history, scaled by a
//! linearly decaying trend, plus a small random jitter. The
//! random source is injected so a seeded [`rand_chacha::ChaCha8Rng`]
//! reproduces a forecast exactly.

use crate::round2;
use chrono::{Datelike, Days, NaiveDate};
use csb_ndvi::time_series::{ForecastPoint, TimeSeries, TimeSeriesPoint};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of trailing history points repeated as the base pattern.
pub const PATTERN_LENGTH: usize = 30;

/// Forecast day at which the trend crosses 1.0.
pub const TREND_ONSET_DAYS: usize = 30;

/// Trend lost per forecast day after the onset.
pub const TREND_DECAY_PER_DAY: f64 = 0.01;

/// The trend never drops below this factor.
pub const MIN_TREND: f64 = 0.1;

/// Jitter is uniform in `[-JITTER_HALF_WIDTH, JITTER_HALF_WIDTH)`.
pub const JITTER_HALF_WIDTH: f64 = 0.05;

pub const MIN_FORECAST_NDVI: f64 = 0.05;
pub const MAX_FORECAST_NDVI: f64 = 0.9;

/// Deterministic random source for reproducible forecasts.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Trend multiplier for forecast day `i`. Early days are boosted above 1.
pub fn trend(i: usize) -> f64 {
    let elapsed = i as f64 - TREND_ONSET_DAYS as f64;
    (1.0 - elapsed * TREND_DECAY_PER_DAY).max(MIN_TREND)
}

/// Lazy forecast sequence returned by [`forecast`].
#[derive(Debug)]
pub struct Forecast<'a, R> {
    pattern: &'a [TimeSeriesPoint],
    start: NaiveDate,
    index: usize,
    len: usize,
    rng: &'a mut R,
}

impl<R: Rng> Iterator for Forecast<'_, R> {
    type Item = ForecastPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len || self.pattern.is_empty() {
            return None;
        }
        let i = self.index;
        let Some(date) = self.start.checked_add_days(Days::new(i as u64)) else {
            self.index = self.len;
            return None;
        };
        self.index += 1;

        let base = self.pattern[i % self.pattern.len()].ndvi;
        let jitter = (self.rng.random::<f64>() - 0.5) * 2.0 * JITTER_HALF_WIDTH;
        let ndvi = (base * trend(i) + jitter).clamp(MIN_FORECAST_NDVI, MAX_FORECAST_NDVI);
        Some(ForecastPoint::new(date, round2(ndvi)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.pattern.is_empty() {
            return (0, Some(0));
        }
        let remaining = self.len - self.index;
        (0, Some(remaining))
    }
}

/// Forecast `days` consecutive daily values starting on `start`, based on
/// the trailing [`PATTERN_LENGTH`] points of `history`.
///
/// An empty history yields an empty sequence.
pub fn forecast<'a, R: Rng>(
    history: &'a [TimeSeriesPoint],
    start: NaiveDate,
    days: usize,
    rng: &'a mut R,
) -> Forecast<'a, R> {
    let from = history.len().saturating_sub(PATTERN_LENGTH);
    Forecast {
        pattern: &history[from..],
        start,
        index: 0,
        len: days,
        rng,
    }
}

/// Repeat the observed pattern into `target_year` with a slow seasonal
/// wobble. Deterministic. February 29 is dropped when `target_year` is not
/// a leap year.
pub fn extend_year(series: &TimeSeries, target_year: i32) -> Vec<ForecastPoint> {
    let mut points: Vec<ForecastPoint> = series
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            let date = point.date.with_year(target_year)?;
            let variation = 1.0 + (i as f64 * 0.1).sin() * 0.05;
            Some(ForecastPoint::new(
                date,
                round2((point.ndvi * variation).clamp(0.0, 1.0)),
            ))
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}
