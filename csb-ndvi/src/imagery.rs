use crate::error::BloomError;
use chrono::NaiveDate;
use csb_utils::dates::{format_date, normalize_date_key, parse_date};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// GIBS WMTS endpoint (Web Mercator, "best" imagery).
pub const GIBS_BASE_URL: &str = "https://gibs.earthdata.nasa.gov/wmts/epsg3857/best";

/// Tile matrix set used for every layer.
pub const GIBS_TILE_MATRIX_SET: &str = "GoogleMapsCompatible_Level9";

/// Imagery layers the map is allowed to request.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ImageryLayer {
    TerraTrueColor,
    TerraNdvi8Day,
    AquaTrueColor,
    AquaNdvi8Day,
}

impl ImageryLayer {
    pub const ALL: [ImageryLayer; 4] = [
        ImageryLayer::TerraTrueColor,
        ImageryLayer::TerraNdvi8Day,
        ImageryLayer::AquaTrueColor,
        ImageryLayer::AquaNdvi8Day,
    ];

    /// GIBS layer identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageryLayer::TerraTrueColor => "MODIS_Terra_CorrectedReflectance_TrueColor",
            ImageryLayer::TerraNdvi8Day => "MODIS_Terra_NDVI_8Day",
            ImageryLayer::AquaTrueColor => "MODIS_Aqua_CorrectedReflectance_TrueColor",
            ImageryLayer::AquaNdvi8Day => "MODIS_Aqua_NDVI_8Day",
        }
    }
}

impl fmt::Display for ImageryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageryLayer {
    type Err = BloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageryLayer::ALL
            .into_iter()
            .find(|layer| layer.as_str() == s.trim())
            .ok_or_else(|| {
                let allowed: Vec<&str> = ImageryLayer::ALL.iter().map(|l| l.as_str()).collect();
                BloomError::InvalidFormat(format!(
                    "invalid layer {s:?}, must be one of: {}",
                    allowed.join(", ")
                ))
            })
    }
}

/// Templated tile URL (`{z}/{y}/{x}` left for the map renderer) for `layer`
/// on `date`. Dates after `today` have no imagery and yield `None`.
pub fn gibs_tile_url(date: &NaiveDate, layer: ImageryLayer, today: &NaiveDate) -> Option<String> {
    if date > today {
        warn!("No imagery for {}: date cannot be in the future", date);
        return None;
    }
    debug!("Generated GIBS URL for {} on {}", layer, date);
    Some(format!(
        "{}/{}/default/{}/{}/{{z}}/{{y}}/{{x}}.jpg",
        GIBS_BASE_URL,
        layer,
        format_date(date),
        GIBS_TILE_MATRIX_SET
    ))
}

/// String-typed variant of [`gibs_tile_url`] validating both inputs first.
pub fn gibs_tile_url_from_str(date: &str, layer: &str, today: &NaiveDate) -> Option<String> {
    let layer = match layer.parse::<ImageryLayer>() {
        Ok(layer) => layer,
        Err(e) => {
            warn!("{}", e);
            return None;
        }
    };
    let date = match normalize_date_key(date)
        .ok()
        .filter(|key| key.trim() == date.trim())
        .and_then(|key| parse_date(&key).ok())
    {
        Some(date) => date,
        None => {
            warn!("Invalid imagery date {:?}, use YYYY-MM-DD", date);
            return None;
        }
    };
    gibs_tile_url(&date, layer, today)
}
