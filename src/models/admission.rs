use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AdmissionStatus;

/// One stay of a patient in a department. Active while `discharge_date` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admission {
    pub id: i64,
    pub patient_id: i64,
    pub department_id: i64,
    pub doctor_username: String,
    pub admission_type_id: i64,
    pub condition: String,
    #[serde(with = "crate::format::wire_timestamp")]
    pub admission_date: NaiveDateTime,
    #[serde(default, with = "crate::format::wire_timestamp::option")]
    pub discharge_date: Option<NaiveDateTime>,
    pub fee: f64,
}

impl Admission {
    pub fn is_active(&self) -> bool {
        self.discharge_date.is_none()
    }

    pub fn status(&self) -> AdmissionStatus {
        status_of(self.discharge_date)
    }

    /// Whole days between admission and discharge, or `now` while still active.
    pub fn length_of_stay(&self, now: NaiveDateTime) -> i64 {
        length_of_stay(self.admission_date, self.discharge_date, now)
    }
}

pub fn status_of(discharge_date: Option<NaiveDateTime>) -> AdmissionStatus {
    match discharge_date {
        Some(_) => AdmissionStatus::Discharged,
        None => AdmissionStatus::Active,
    }
}

pub fn length_of_stay(
    admitted: NaiveDateTime,
    discharged: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> i64 {
    let end = discharged.unwrap_or(now);
    (end - admitted).num_days().max(0)
}

/// Row to insert; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAdmission {
    pub patient_id: i64,
    pub department_id: i64,
    pub doctor_username: String,
    pub admission_type_id: i64,
    pub condition: String,
    pub admission_date: NaiveDateTime,
    pub fee: f64,
}

/// Caller input for admitting a patient.
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionRequest {
    pub patient_id: i64,
    pub department_id: i64,
    pub doctor_username: String,
    pub admission_type_id: i64,
    #[serde(default)]
    pub condition: String,
    pub fee: Option<f64>,
}

/// Admission joined with every display name it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRow {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub department_id: i64,
    pub department_name: String,
    pub doctor_username: String,
    pub doctor_name: String,
    pub admission_type_id: i64,
    pub admission_type: String,
    pub condition: String,
    #[serde(with = "crate::format::wire_timestamp")]
    pub admission_date: NaiveDateTime,
    #[serde(default, with = "crate::format::wire_timestamp::option")]
    pub discharge_date: Option<NaiveDateTime>,
    pub fee: f64,
}

impl AdmissionRow {
    pub fn is_active(&self) -> bool {
        self.discharge_date.is_none()
    }

    pub fn status(&self) -> AdmissionStatus {
        status_of(self.discharge_date)
    }
}
