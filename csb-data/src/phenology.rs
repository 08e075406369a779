//! Bloom onset and peak detection over an observed season.

use chrono::NaiveDate;
use csb_ndvi::date_range::DateRange;
use csb_ndvi::time_series::{TimeSeries, TimeSeriesPoint};
use csb_utils::dates::days_between;

/// NDVI at which an early bloom alert is raised.
pub const BLOOM_ALERT_NDVI: f64 = 0.22;

/// First date whose NDVI reaches `threshold`.
pub fn detect_bloom_alert(series: &TimeSeries, threshold: f64) -> Option<NaiveDate> {
    series.iter().find(|p| p.ndvi >= threshold).map(|p| p.date)
}

/// Highest-NDVI point. The earliest point wins a tie.
pub fn peak_bloom(series: &TimeSeries) -> Option<&TimeSeriesPoint> {
    series.iter().fold(None, |best, point| match best {
        Some(b) if b.ndvi >= point.ndvi => Some(b),
        _ => Some(point),
    })
}

/// Days of warning an alert on `alert` gives before the peak on `peak`.
pub fn days_advance_warning(alert: &NaiveDate, peak: &NaiveDate) -> i64 {
    days_between(alert, peak)
}

/// Points dated within `start..=end`.
pub fn filter_by_date_range(series: &TimeSeries, start: &NaiveDate, end: &NaiveDate) -> TimeSeries {
    let range = DateRange(*start, *end);
    series
        .iter()
        .filter(|p| range.contains(&p.date))
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    static NDVI_CSV: &str = include_str!("../../fixtures/data/anzaborrego.csv");

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_alert_and_peak() {
        let series = TimeSeries::parse_csv(NDVI_CSV).unwrap();
        let alert = detect_bloom_alert(&series, BLOOM_ALERT_NDVI).unwrap();
        assert_eq!(alert, ymd(2017, 3, 9));
        let peak = peak_bloom(&series).unwrap();
        assert_eq!(peak.date, ymd(2017, 3, 17));
        assert_eq!(peak.ndvi, 0.258);
        assert_eq!(days_advance_warning(&alert, &peak.date), 8);
        assert!(detect_bloom_alert(&series, 0.5).is_none());
    }

    #[test]
    fn test_empty_series() {
        let series = TimeSeries::default();
        assert!(peak_bloom(&series).is_none());
        assert!(detect_bloom_alert(&series, BLOOM_ALERT_NDVI).is_none());
    }

    #[test]
    fn test_peak_tie_keeps_earliest() {
        let series = TimeSeries::parse_csv("date,ndvi\n2017-03-01,0.3\n2017-03-09,0.3\n").unwrap();
        assert_eq!(peak_bloom(&series).unwrap().date, ymd(2017, 3, 1));
    }

    #[test]
    fn test_filter_by_date_range() {
        let series = TimeSeries::parse_csv(NDVI_CSV).unwrap();
        let spring = filter_by_date_range(&series, &ymd(2017, 3, 1), &ymd(2017, 3, 25));
        assert_eq!(spring.len(), 4);
        assert_eq!(spring.first().unwrap().date, ymd(2017, 3, 1));
        assert_eq!(spring.last().unwrap().date, ymd(2017, 3, 25));
        assert!(filter_by_date_range(&series, &ymd(2017, 4, 1), &ymd(2017, 3, 1)).is_empty());
    }
}
