//! Bloom status classification.
//!
//! A single set of ascending NDVI cut points per location drives the status
//! label, the map overlay opacity and the heat-map intensity. Locations
//! without their own cut points use [`Thresholds::GLOBAL`]. Outside the
//! February through May window every location is dormant.

use chrono::{Datelike, NaiveDate};
use csb_ndvi::date_range::DateRange;
use csb_ndvi::location::{LocationConfig, Thresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloomStatus {
    Dormant,
    Emerging,
    Blooming,
    PeakBloom,
}

impl BloomStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BloomStatus::Dormant => "Dormant",
            BloomStatus::Emerging => "Emerging",
            BloomStatus::Blooming => "Blooming",
            BloomStatus::PeakBloom => "Peak Bloom",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            BloomStatus::Dormant => "🏜️",
            BloomStatus::Emerging => "🌿",
            BloomStatus::Blooming => "🌱",
            BloomStatus::PeakBloom => "🌼",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BloomStatus::Dormant => "Little or no flowering vegetation",
            BloomStatus::Emerging => "Early green-up, scattered blooms",
            BloomStatus::Blooming => "Widespread wildflower activity",
            BloomStatus::PeakBloom => "Superbloom conditions",
        }
    }
}

impl fmt::Display for BloomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rendering state for one location on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBloomState {
    pub status: BloomStatus,
    /// Overlay opacity, 0..=0.8
    pub opacity: f64,
    /// Heat-map weight, 0..=1.6
    pub intensity: f64,
    /// Whether the date falls in the bloom window at all
    pub in_season: bool,
}

impl ClassifiedBloomState {
    /// Nothing drawn.
    pub const DORMANT: ClassifiedBloomState = ClassifiedBloomState {
        status: BloomStatus::Dormant,
        opacity: 0.0,
        intensity: 0.0,
        in_season: false,
    };

    pub fn label(&self) -> &'static str {
        self.status.label()
    }

    pub fn tag(&self) -> &'static str {
        self.status.tag()
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Per-band values, indexed by [`band`].
const OPACITY: [f64; 5] = [0.0, 0.15, 0.4, 0.6, 0.8];
const INTENSITY: [f64; 5] = [0.0, 0.2, 0.6, 1.0, 1.6];
const STATUS: [BloomStatus; 5] = [
    BloomStatus::Dormant,
    BloomStatus::Dormant,
    BloomStatus::Emerging,
    BloomStatus::Blooming,
    BloomStatus::PeakBloom,
];

/// Index of the band `ndvi` falls in, 0..=4. Non-finite values land in 0.
fn band(ndvi: f64, thresholds: &Thresholds) -> usize {
    if !ndvi.is_finite() {
        return 0;
    }
    [
        thresholds.no_bloom,
        thresholds.emerging,
        thresholds.blooming,
        thresholds.peak_bloom,
    ]
    .iter()
    .position(|cut| ndvi < *cut)
    .unwrap_or(4)
}

/// Whether blooms are drawn at all on `date`.
pub fn is_bloom_season(date: &NaiveDate) -> bool {
    DateRange::bloom_season(date.year()).is_some_and(|season| season.contains(date))
}

/// Status for `ndvi` ignoring the season, as shown in detail panels.
pub fn bloom_status(ndvi: f64, thresholds: Option<&Thresholds>) -> BloomStatus {
    STATUS[band(ndvi, thresholds.unwrap_or(&Thresholds::GLOBAL))]
}

/// Classify `ndvi` on `date`.
pub fn classify(ndvi: f64, date: &NaiveDate, thresholds: Option<&Thresholds>) -> ClassifiedBloomState {
    if !is_bloom_season(date) {
        return ClassifiedBloomState::DORMANT;
    }
    let i = band(ndvi, thresholds.unwrap_or(&Thresholds::GLOBAL));
    ClassifiedBloomState {
        status: STATUS[i],
        opacity: OPACITY[i],
        intensity: INTENSITY[i],
        in_season: true,
    }
}

/// Classify using the location's own thresholds. Disabled locations are
/// never drawn.
pub fn classify_location(ndvi: f64, date: &NaiveDate, location: &LocationConfig) -> ClassifiedBloomState {
    if !location.is_enabled() {
        return ClassifiedBloomState {
            in_season: is_bloom_season(date),
            ..ClassifiedBloomState::DORMANT
        };
    }
    classify(ndvi, date, Some(&location.thresholds_or_global()))
}

/// Legend colour for `ndvi`.
pub fn bloom_color(ndvi: f64, thresholds: Option<&Thresholds>) -> &'static str {
    let thresholds = thresholds.unwrap_or(&Thresholds::GLOBAL);
    if !ndvi.is_finite() || ndvi < thresholds.emerging {
        "#fef3c7"
    } else if ndvi < thresholds.blooming {
        "#fde68a"
    } else if ndvi < thresholds.peak_bloom {
        "#fbbf24"
    } else {
        "#ec4899"
    }
}
