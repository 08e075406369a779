use crate::error::BloomError;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::warn;
use serde::{Deserialize, Serialize};

/// Embedded CSV table of every monitored bloom location.
pub static LOCATIONS_CSV: &str = include_str!("../../fixtures/locations.csv");

/// NDVI cut points separating the bloom stages of a location, ascending.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    pub no_bloom: f64,
    pub emerging: f64,
    pub blooming: f64,
    pub peak_bloom: f64,
}

impl Thresholds {
    /// Breakpoints used wherever a location has no configured thresholds.
    pub const GLOBAL: Thresholds = Thresholds {
        no_bloom: 0.08,
        emerging: 0.12,
        blooming: 0.18,
        peak_bloom: 0.25,
    };

    /// Classification assumes `no_bloom < emerging < blooming < peak_bloom`
    /// but does not enforce it.
    pub fn is_ascending(&self) -> bool {
        self.no_bloom < self.emerging
            && self.emerging < self.blooming
            && self.blooming < self.peak_bloom
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds::GLOBAL
    }
}

/// A monitored bloom location.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Stable identifier (e.g., "anza-borrego")
    pub id: String,
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// NDVI series file, relative to the data root
    pub data_file: Option<String>,
    /// Model forecast file, relative to the data root
    pub forecast_file: Option<String>,
    /// Legend colour
    pub color: String,
    pub thresholds: Option<Thresholds>,
    pub disabled: bool,
    pub disabled_reason: Option<String>,
}

impl LocationConfig {
    /// `(lat, lon)`
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    /// Configured thresholds, or [`Thresholds::GLOBAL`] when none are set.
    pub fn thresholds_or_global(&self) -> Thresholds {
        match self.thresholds {
            Some(t) => t,
            None => {
                warn!("No thresholds for {}, using global breakpoints", self.id);
                Thresholds::GLOBAL
            }
        }
    }
}

fn optional_string(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn optional_f64(field: Option<&str>) -> Option<f64> {
    field.and_then(|s| s.trim().parse::<f64>().ok())
}

fn parse_bool(field: Option<&str>) -> bool {
    let lowered = field.unwrap_or_default().trim().to_lowercase();
    matches!(lowered.as_str(), "true" | "yes" | "1" | "y")
}

impl TryFrom<StringRecord> for LocationConfig {
    type Error = BloomError;

    fn try_from(record: StringRecord) -> Result<Self, Self::Error> {
        let id = optional_string(record.get(0))
            .ok_or_else(|| BloomError::InvalidFormat("location row without id".to_string()))?;
        let name = optional_string(record.get(1)).unwrap_or_else(|| id.clone());
        let latitude = optional_f64(record.get(2)).unwrap_or(0.0);
        let longitude = optional_f64(record.get(3)).unwrap_or(0.0);
        let thresholds = match (
            optional_f64(record.get(7)),
            optional_f64(record.get(8)),
            optional_f64(record.get(9)),
            optional_f64(record.get(10)),
        ) {
            (Some(no_bloom), Some(emerging), Some(blooming), Some(peak_bloom)) => {
                let thresholds = Thresholds {
                    no_bloom,
                    emerging,
                    blooming,
                    peak_bloom,
                };
                if !thresholds.is_ascending() {
                    warn!("Thresholds for {} are not ascending: {:?}", id, thresholds);
                }
                Some(thresholds)
            }
            _ => None,
        };
        Ok(LocationConfig {
            name,
            latitude,
            longitude,
            data_file: optional_string(record.get(4)),
            forecast_file: optional_string(record.get(5)),
            color: optional_string(record.get(6)).unwrap_or_else(|| "#9ca3af".to_string()),
            thresholds,
            disabled: parse_bool(record.get(11)),
            disabled_reason: optional_string(record.get(12)),
            id,
        })
    }
}

/// Process-wide lookup table of locations, keyed by id and kept in file order.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct LocationTable {
    locations: Vec<LocationConfig>,
}

impl LocationTable {
    pub fn new(locations: Vec<LocationConfig>) -> LocationTable {
        LocationTable { locations }
    }

    /// The embedded location table.
    pub fn embedded() -> Result<LocationTable, BloomError> {
        LocationTable::parse_location_csv(LOCATIONS_CSV)
    }

    /// Parse a CSV string of location data.
    ///
    /// Expected CSV columns: id, name, latitude, longitude, data_file,
    /// forecast_file, color, no_bloom, emerging, blooming, peak_bloom,
    /// disabled, disabled_reason
    pub fn parse_location_csv(csv_object: &str) -> Result<LocationTable, BloomError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        let mut locations: Vec<LocationConfig> = Vec::new();
        for row in rdr.records() {
            let location: LocationConfig = row?.try_into()?;
            if locations.iter().any(|l| l.id == location.id) {
                warn!("Duplicate location id {}, keeping the first", location.id);
                continue;
            }
            locations.push(location);
        }
        Ok(LocationTable { locations })
    }

    pub fn get(&self, id: &str) -> Option<&LocationConfig> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Like [`LocationTable::get`], but unknown ids are an error.
    pub fn require(&self, id: &str) -> Result<&LocationConfig, BloomError> {
        self.get(id)
            .ok_or_else(|| BloomError::LocationNotFound(id.to_string()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationConfig> {
        self.locations.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &LocationConfig> {
        self.locations.iter().filter(|l| l.is_enabled())
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.get(id).is_some_and(LocationConfig::is_enabled)
    }

    /// Thresholds for `id`. Unknown locations and locations without
    /// configured thresholds degrade to [`Thresholds::GLOBAL`].
    pub fn thresholds_for(&self, id: &str) -> Thresholds {
        match self.get(id) {
            Some(location) => location.thresholds_or_global(),
            None => {
                warn!("Unknown location {}, using global breakpoints", id);
                Thresholds::GLOBAL
            }
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
