use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Open admissions against bed capacity. `ratio` is a percentage with one
/// decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Occupancy {
    pub active: u32,
    pub capacity: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Revenue {
    pub total: f64,
    pub formatted: String,
}

/// Half-open timestamp window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Calendar month containing `now`, from day 1 at midnight.
    pub fn current_month(now: NaiveDateTime) -> Self {
        let start = month_start(now.date());
        Self::new(midnight(start), midnight(next_month_start(start)))
    }

    /// Calendar month before the one containing `now`.
    pub fn previous_month(now: NaiveDateTime) -> Self {
        let this_month = month_start(now.date());
        let start = month_start(this_month - Duration::days(1));
        Self::new(midnight(start), midnight(this_month))
    }

    pub fn day(date: NaiveDate) -> Self {
        Self::new(midnight(date), midnight(date + Duration::days(1)))
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn next_month_start(start: NaiveDate) -> NaiveDate {
    // Day 1 plus 32 days always lands in the following month.
    month_start(start + Duration::days(32))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    #[serde(with = "date_text")]
    pub date: NaiveDate,
    pub count: u32,
}

/// Aggregate of one group; the map key carries the group's natural key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    pub count: u32,
    pub active_count: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveCount {
    pub total: u32,
    pub active: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BedStatistics {
    pub total: u32,
    pub occupied: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub patients: ActiveCount,
    pub doctors: ActiveCount,
    pub departments: ActiveCount,
    pub beds: BedStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityAlert {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentOccupancy {
    pub id: i64,
    pub name: String,
    pub active_patients: u32,
    pub total_admissions: u32,
    pub occupancy: f64,
    /// Fees booked this calendar month.
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientStatistics {
    pub total: u32,
    pub trend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdmissionStatistics {
    pub active: u32,
    pub today: u32,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueStatistics {
    pub monthly: f64,
    pub formatted: String,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorLoad {
    pub username: String,
    pub name: String,
    pub active_patients: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorStatistics {
    pub total: u32,
    pub active: u32,
    pub doctors: Vec<DoctorLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentLoad {
    pub name: String,
    pub occupancy: f64,
}

/// Dashboard header: this month's revenue, last week of admissions and
/// per-department occupancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub revenue: Revenue,
    pub admission_trends: Vec<DailyCount>,
    pub department_occupancy: Vec<DepartmentLoad>,
}

pub(crate) mod date_text {
    use chrono::NaiveDate;
    use serde::Serializer;

    use crate::models::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(DATE_FORMAT).to_string())
    }
}
