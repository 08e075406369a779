pub mod date_range;
pub mod error;
pub mod forecast_file;
pub mod imagery;
pub mod location;
#[cfg(feature = "api")]
pub mod power;
pub mod precipitation;
pub mod prediction_catalog;
pub mod time_series;
