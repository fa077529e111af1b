use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One group of admissions (a department, a doctor or an admission type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Natural key: department name, doctor username or admission type name.
    pub key: String,
    /// Display label: same as `key` except for doctors (display name).
    pub label: String,
    pub count: u32,
    pub active_count: u32,
    pub revenue: f64,
}

/// Admissions and fees booked on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub count: u32,
    pub revenue: f64,
}
