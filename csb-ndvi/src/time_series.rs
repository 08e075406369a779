use crate::error::BloomError;
use chrono::NaiveDate;
use csb_utils::dates::parse_date;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use serde::{Deserialize, Serialize};

/// Where a value came from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Read directly from an observed series.
    Observed,
    /// Taken unadjusted from the closest observed point within the lookup window.
    Nearest,
    /// Linearly interpolated between two observed points.
    Interpolated,
    /// Synthesized by the forecast extrapolator.
    Forecast,
}

/// A single NDVI observation for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub ebi: f64,
    pub cloud_cover: f64,
}

/// A synthesized NDVI value beyond the observed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub ndvi: f64,
    pub provenance: Provenance,
}

impl ForecastPoint {
    pub fn new(date: NaiveDate, ndvi: f64) -> ForecastPoint {
        ForecastPoint {
            date,
            ndvi,
            provenance: Provenance::Forecast,
        }
    }
}

/// Parse a numeric field, defaulting to 0 for blank, missing or malformed input.
pub(crate) fn parse_f64_or_zero(field: Option<&str>) -> f64 {
    field
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl TryFrom<StringRecord> for TimeSeriesPoint {
    type Error = BloomError;

    fn try_from(value: StringRecord) -> Result<Self, Self::Error> {
        let date_field = value.get(0).unwrap_or_default();
        let date = parse_date(date_field)
            .map_err(|e| BloomError::DateParse(format!("{date_field:?}: {e}")))?;
        Ok(TimeSeriesPoint {
            date,
            ndvi: parse_f64_or_zero(value.get(1)),
            ebi: parse_f64_or_zero(value.get(2)),
            cloud_cover: parse_f64_or_zero(value.get(3)),
        })
    }
}

/// A date-ordered NDVI series for one location.
///
/// Source files are not guaranteed to be sorted; ordering is imposed on
/// construction so every consumer can rely on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(mut points: Vec<TimeSeriesPoint>) -> TimeSeries {
        points.sort_by_key(|p| p.date);
        TimeSeries { points }
    }

    /// Parse an NDVI CSV body (`date,ndvi,ebi,cloudCover` with a header line).
    ///
    /// Short or malformed numeric fields default to 0. Rows whose date is
    /// missing or unparseable are dropped.
    pub fn parse_csv(csv_object: &str) -> Result<TimeSeries, BloomError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        let mut points = Vec::new();
        let mut dropped = 0usize;
        for row in rdr.records() {
            let record = row?;
            match TimeSeriesPoint::try_from(record) {
                Ok(point) => points.push(point),
                Err(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!("dropped {} NDVI rows without a usable date", dropped);
        }
        Ok(TimeSeries::new(points))
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimeSeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimeSeriesPoint> {
        self.points.last()
    }

    /// Earliest and latest observed dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// The trailing `n` points (or all of them when the series is shorter).
    pub fn tail(&self, n: usize) -> &[TimeSeriesPoint] {
        let start = self.points.len().saturating_sub(n);
        &self.points[start..]
    }
}

impl From<Vec<TimeSeriesPoint>> for TimeSeries {
    fn from(points: Vec<TimeSeriesPoint>) -> Self {
        TimeSeries::new(points)
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a TimeSeriesPoint;
    type IntoIter = std::slice::Iter<'a, TimeSeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
