use chrono::{Datelike, NaiveDate};
use std::mem::replace;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// The winter preceding a bloom season: December 1 of `year - 1`
    /// through the last day of February of `year`.
    pub fn winter(year: i32) -> Option<DateRange> {
        let start = NaiveDate::from_ymd_opt(year - 1, 12, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 3, 1)?.pred_opt()?;
        Some(DateRange(start, end))
    }

    /// Spring of `year`: March 1 through May 31.
    pub fn spring(year: i32) -> Option<DateRange> {
        let start = NaiveDate::from_ymd_opt(year, 3, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 5, 31)?;
        Some(DateRange(start, end))
    }

    /// The bloom window of `year`: February 1 through May 31.
    pub fn bloom_season(year: i32) -> Option<DateRange> {
        let start = NaiveDate::from_ymd_opt(year, 2, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 5, 31)?;
        Some(DateRange(start, end))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    pub fn end(&self) -> NaiveDate {
        self.1
    }

    /// Whether `date` falls inside the range, inclusive on both ends.
    pub fn contains(&self, date: &NaiveDate) -> bool {
        self.0 <= *date && *date <= self.1
    }

    /// Number of days covered, inclusive on both ends.
    pub fn num_days(&self) -> i64 {
        ((self.1 - self.0).num_days() + 1).max(0)
    }

    /// Year the range ends in, which names the season.
    pub fn season_year(&self) -> i32 {
        self.1.year()
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0.succ_opt()?;
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}
