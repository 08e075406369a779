//! Data processing for NDVI observations.
//!
//! This crate turns raw NDVI and precipitation series into values the
//! map and charts can use: date lookup, forecast extrapolation, bloom
//! classification, winter rainfall aggregation and the bloom outlook.

pub mod aggregate;
pub mod classify;
pub mod cutoff;
pub mod forecast;
pub mod lookup;
pub mod phenology;
pub mod prediction;

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
