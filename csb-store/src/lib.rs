//! Per-location NDVI series cache.
//!
//! Series files are read through a [`SeriesSource`] the first time a
//! location is asked for and kept until invalidated. Every method takes
//! `&self`; the caches sit behind `Rc<RefCell<..>>` so a store can be
//! cloned and shared across views on one thread.
//!
//! # Usage
//!
//! ```rust
//! use csb_ndvi::location::LocationTable;
//! use csb_store::{source::MemorySource, SeriesStore};
//!
//! let store = SeriesStore::new(MemorySource::embedded(), LocationTable::embedded().unwrap());
//! let series = store.load("anza-borrego");
//! assert!(!series.is_empty());
//! ```
//!
//! Failures (unknown location, no data file, unreadable or empty file) are
//! logged and produce an empty series. They are not cached, so a later call
//! retries the source.

mod loader;
pub mod models;
mod queries;
pub mod source;

use csb_ndvi::forecast_file::ForecastRecord;
use csb_ndvi::location::LocationTable;
use csb_ndvi::time_series::TimeSeries;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use source::SeriesSource;

pub struct SeriesStore<S> {
    source: Rc<S>,
    locations: Rc<LocationTable>,
    series: Rc<RefCell<HashMap<String, TimeSeries>>>,
    forecasts: Rc<RefCell<HashMap<String, Vec<ForecastRecord>>>>,
}

impl<S> Clone for SeriesStore<S> {
    fn clone(&self) -> Self {
        SeriesStore {
            source: Rc::clone(&self.source),
            locations: Rc::clone(&self.locations),
            series: Rc::clone(&self.series),
            forecasts: Rc::clone(&self.forecasts),
        }
    }
}

impl<S: SeriesSource> SeriesStore<S> {
    pub fn new(source: S, locations: LocationTable) -> SeriesStore<S> {
        SeriesStore {
            source: Rc::new(source),
            locations: Rc::new(locations),
            series: Rc::new(RefCell::new(HashMap::new())),
            forecasts: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether a series for `id` is currently cached.
    pub fn is_cached(&self, id: &str) -> bool {
        self.series.borrow().contains_key(id)
    }
}
