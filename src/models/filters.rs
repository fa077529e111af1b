use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use super::enums::StatusFilter;

/// Years whose `YYYY-MM-DD` text sorts correctly against stored timestamps.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

pub const UNSTORABLE_DATE: &str = "dates must fall between years 0000 and 9999";

pub fn is_storable_date(date: NaiveDate) -> bool {
    STORABLE_YEARS.contains(&date.year())
}

/// Calendar-day range; both ends inclusive, either end open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Both ends fall in `STORABLE_YEARS`.
    pub fn is_storable(&self) -> bool {
        self.start.map_or(true, is_storable_date) && self.end.map_or(true, is_storable_date)
    }

    /// Lower timestamp bound (inclusive).
    pub fn lower_bound(&self) -> Option<NaiveDateTime> {
        self.start.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Upper timestamp bound (exclusive): midnight after the end day.
    /// Open when that midnight is past the last storable day.
    pub fn upper_bound(&self) -> Option<NaiveDateTime> {
        self.end
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .filter(|d| is_storable_date(*d))
            .map(|d| d.and_time(NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdmissionFilter {
    pub admission_id: Option<i64>,
    pub status: Option<StatusFilter>,
    pub department_id: Option<i64>,
    pub doctor_username: Option<String>,
    pub patient_id: Option<i64>,
    pub range: DateRange,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_bound_covers_whole_day() {
        let range = DateRange::new(None, NaiveDate::from_ymd_opt(2026, 1, 31));
        let upper = range.upper_bound().unwrap();
        assert_eq!(upper.to_string(), "2026-02-01 00:00:00");
    }

    #[test]
    fn end_bound_at_calendar_limits_is_open() {
        assert_eq!(DateRange::new(None, Some(NaiveDate::MAX)).upper_bound(), None);
        let last = NaiveDate::from_ymd_opt(9999, 12, 31);
        assert_eq!(DateRange::new(None, last).upper_bound(), None);
    }

    #[test]
    fn storable_years() {
        assert!(DateRange::new(NaiveDate::from_ymd_opt(1, 1, 1), NaiveDate::from_ymd_opt(9999, 12, 31)).is_storable());
        assert!(!DateRange::new(None, Some(NaiveDate::MAX)).is_storable());
        assert!(!DateRange::new(NaiveDate::from_ymd_opt(-1, 6, 1), None).is_storable());
        assert!(DateRange::default().is_storable());
    }

    #[test]
    fn inverted_range_detected() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 2, 1),
            NaiveDate::from_ymd_opt(2026, 1, 1),
        );
        assert!(range.is_inverted());
        assert!(!DateRange::default().is_inverted());
    }
}
