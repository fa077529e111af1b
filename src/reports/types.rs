use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{AdmissionRow, AdmissionStatus};

/// Count, revenue and open count of one slice of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub count: u32,
    pub revenue: f64,
    #[serde(rename = "active")]
    pub active_count: u32,
}

/// One admission with every reference resolved to its display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub patient_name: String,
    pub department: String,
    pub doctor: String,
    #[serde(rename = "type")]
    pub admission_type: String,
    #[serde(with = "crate::format::wire_timestamp")]
    pub admission_date: NaiveDateTime,
    #[serde(with = "crate::format::wire_timestamp::option")]
    pub discharge_date: Option<NaiveDateTime>,
    pub condition: String,
    pub fee: f64,
    pub status: AdmissionStatus,
}

impl From<AdmissionRow> for ReportRow {
    fn from(row: AdmissionRow) -> Self {
        Self {
            status: row.status(),
            id: row.id,
            patient_name: row.patient_name,
            department: row.department_name,
            doctor: row.doctor_name,
            admission_type: row.admission_type,
            admission_date: row.admission_date,
            discharge_date: row.discharge_date,
            condition: row.condition,
            fee: crate::format::round2(row.fee),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionsReport {
    pub total_admissions: u32,
    pub total_revenue: f64,
    #[serde(rename = "active_admissions")]
    pub active_count: u32,
    #[serde(rename = "department_stats")]
    pub per_department: BTreeMap<String, Breakdown>,
    #[serde(rename = "type_stats")]
    pub per_admission_type: BTreeMap<String, Breakdown>,
    #[serde(rename = "admissions")]
    pub rows: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    #[serde(with = "crate::statistics::date_text")]
    pub date: NaiveDate,
    pub count: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub total_revenue: f64,
    pub total_admissions: u32,
    pub daily_stats: Vec<DailyRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentReportRow {
    #[serde(rename = "department")]
    pub department_name: String,
    pub total_admissions: u32,
    #[serde(rename = "active_patients")]
    pub active_count: u32,
    pub total_revenue: f64,
}

/// Entry of the recent-admissions feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentAdmission {
    pub id: i64,
    pub patient_name: String,
    pub department: String,
    pub doctor: String,
    #[serde(with = "crate::format::wire_timestamp")]
    pub admission_date: NaiveDateTime,
    pub status: AdmissionStatus,
}
