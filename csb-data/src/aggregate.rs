//! Seasonal aggregates used to relate winter rain to spring bloom.

use crate::round2;
use csb_ndvi::date_range::DateRange;
use csb_ndvi::precipitation::{ClimateDay, PrecipitationSeries};
use csb_ndvi::time_series::TimeSeries;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Total precipitation from December 1 of `year - 1` through the end of
/// February of `year`. Only days present in `precipitation` contribute; an
/// empty window is `None`, not zero.
pub fn winter_total(precipitation: &PrecipitationSeries, year: i32) -> Option<f64> {
    let winter = DateRange::winter(year)?;
    let mut days = 0usize;
    let total: f64 = precipitation
        .range(winter.start()..=winter.end())
        .inspect(|_| days += 1)
        .map(|(_, mm)| *mm)
        .sum();
    debug!("winter {}: {:.1} mm over {} days", year, total, days);
    (days > 0).then_some(total)
}

/// Winter totals for each season in `years`.
pub fn winter_totals(
    precipitation: &PrecipitationSeries,
    years: RangeInclusive<i32>,
) -> Vec<(i32, Option<f64>)> {
    years
        .map(|year| (year, winter_total(precipitation, year)))
        .collect()
}

/// Highest NDVI observed from March through May of `year`, 0 when there
/// are no observations in that window.
pub fn spring_peak_ndvi(series: &TimeSeries, year: i32) -> f64 {
    let Some(spring) = DateRange::spring(year) else {
        return 0.0;
    };
    series
        .iter()
        .filter(|p| spring.contains(&p.date))
        .map(|p| p.ndvi)
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Mean daily temperature from March through May of `year`, rounded to one
/// decimal place.
pub fn spring_mean_temperature(climate: &[ClimateDay], year: i32) -> Option<f64> {
    let spring = DateRange::spring(year)?;
    let temperatures: Vec<f64> = climate
        .iter()
        .filter(|d| spring.contains(&d.date))
        .map(|d| d.temperature_c)
        .collect();
    if temperatures.is_empty() {
        return None;
    }
    let mean = temperatures.iter().sum::<f64>() / temperatures.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// One season's winter rain next to the spring bloom it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub year: i32,
    pub winter_precipitation_mm: Option<f64>,
    pub spring_peak_ndvi: f64,
}

/// Per-season summaries for every year in `years`.
pub fn season_summaries(
    series: &TimeSeries,
    precipitation: &PrecipitationSeries,
    years: RangeInclusive<i32>,
) -> Vec<SeasonSummary> {
    years
        .map(|year| SeasonSummary {
            year,
            winter_precipitation_mm: winter_total(precipitation, year).map(round2),
            spring_peak_ndvi: spring_peak_ndvi(series, year),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use csb_ndvi::time_series::TimeSeriesPoint;

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

    #[test]
    fn test_winter_total() {
        let precipitation =
            PrecipitationSeries::from_compact_map([("20161215", 10.0), ("20170110", 5.0)]);
        assert_eq!(winter_total(&precipitation, 2017), Some(15.0));
        assert_eq!(winter_total(&precipitation, 2018), None);
    }

    #[test]
    fn test_winter_window_edges() {
        let precipitation = PrecipitationSeries::from_compact_map([
            ("20161130", 100.0),
            ("20161201", 1.0),
            ("20170228", 2.0),
            ("20170301", 100.0),
        ]);
        assert_eq!(winter_total(&precipitation, 2017), Some(3.0));

        let leap = PrecipitationSeries::from_compact_map([("20200229", 4.0)]);
        assert_eq!(winter_total(&leap, 2020), Some(4.0));
    }

    #[test]
    fn test_winter_zero_rain_is_present() {
        let precipitation = PrecipitationSeries::from_compact_map([("20170105", 0.0)]);
        assert_eq!(winter_total(&precipitation, 2017), Some(0.0));
        assert_eq!(
            winter_totals(&precipitation, 2016..=2017),
            vec![(2016, None), (2017, Some(0.0))]
        );
    }

    #[test]
    fn test_spring_peak_ndvi() {
        let series = TimeSeries::new(vec![
            point(ymd(2017, 2, 28), 0.9),
            point(ymd(2017, 3, 17), 0.258),
            point(ymd(2017, 5, 31), 0.1),
            point(ymd(2017, 6, 1), 0.8),
        ]);
        assert_eq!(spring_peak_ndvi(&series, 2017), 0.258);
        assert_eq!(spring_peak_ndvi(&series, 2018), 0.0);
        assert_eq!(spring_peak_ndvi(&TimeSeries::default(), 2017), 0.0);
    }

    #[test]
    fn test_spring_peak_ndvi_negative() {
        let series = TimeSeries::new(vec![
            TimeSeriesPoint {
                date: NaiveDate::from_ymd_opt(2019, 4, 10).unwrap(),
                ndvi: -0.04,
                ebi: 0.0,
                cloud_cover: 0.0,
            },
            TimeSeriesPoint {
                date: NaiveDate::from_ymd_opt(2019, 4, 26).unwrap(),
                ndvi: -0.07,
                ebi: 0.0,
                cloud_cover: 0.0,
            },
        ]);
        assert_eq!(spring_peak_ndvi(&series, 2019), -0.04);
    }

    #[test]
    fn test_spring_mean_temperature() {
        let climate = vec![
            ClimateDay {
                date: ymd(2017, 3, 1),
                temperature_c: 16.0,
                precipitation_mm: 0.0,
            },
            ClimateDay {
                date: ymd(2017, 4, 1),
                temperature_c: 19.5,
                precipitation_mm: 0.0,
            },
            ClimateDay {
                date: ymd(2017, 7, 1),
                temperature_c: 40.0,
                precipitation_mm: 0.0,
            },
        ];
        assert_eq!(spring_mean_temperature(&climate, 2017), Some(17.8));
        assert_eq!(spring_mean_temperature(&climate, 2016), None);
    }

    #[test]
    fn test_season_summaries() {
        let series = TimeSeries::new(vec![point(ymd(2017, 3, 17), 0.258)]);
        let precipitation = PrecipitationSeries::from_compact_map([("20170110", 12.346)]);
        let summaries = season_summaries(&series, &precipitation, 2017..=2017);
        assert_eq!(
            summaries,
            vec![SeasonSummary {
                year: 2017,
                winter_precipitation_mm: Some(12.35),
                spring_peak_ndvi: 0.258,
            }]
        );
    }
}
