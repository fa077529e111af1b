use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::{AdmissionStore, EntityStore, ReferenceStore};
use crate::error::ServiceError;
use crate::format::{round1, round2};
use crate::lifecycle::AdmissionView;
use crate::models::{AdmissionFilter, Doctor, Patient};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientHistory {
    pub patient: Patient,
    pub admissions: Vec<AdmissionView>,
    pub current_admission: Option<AdmissionView>,
    pub total_admissions: u32,
    pub total_spent: f64,
    /// Days of completed stays divided by all admissions, one decimal.
    pub avg_stay: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorHistory {
    pub doctor: Doctor,
    pub active_patients: Vec<AdmissionView>,
    pub admissions: Vec<AdmissionView>,
    pub total_patients: u32,
    pub current_patients: u32,
    pub total_discharged: u32,
}

/// All admissions of a patient, newest first, with spend and stay totals.
pub fn patient_history(
    store: &dyn EntityStore,
    patient_id: i64,
    now: NaiveDateTime,
) -> Result<PatientHistory, ServiceError> {
    let patient = store
        .patient(patient_id)?
        .ok_or_else(|| ServiceError::not_found("patient", patient_id))?;
    let admissions: Vec<AdmissionView> = store
        .admissions(&AdmissionFilter {
            patient_id: Some(patient_id),
            ..Default::default()
        })?
        .into_iter()
        .map(|row| AdmissionView::new(row, now))
        .collect();

    let total_admissions = admissions.len() as u32;
    let total_spent = round2(admissions.iter().map(|a| a.admission.fee).sum());
    let discharged_days: i64 = admissions
        .iter()
        .filter(|a| !a.admission.is_active())
        .map(|a| a.length_of_stay)
        .sum();
    let avg_stay = if total_admissions == 0 {
        0.0
    } else {
        round1(discharged_days as f64 / f64::from(total_admissions))
    };
    let current_admission = admissions.iter().find(|a| a.admission.is_active()).cloned();

    Ok(PatientHistory {
        patient,
        admissions,
        current_admission,
        total_admissions,
        total_spent,
        avg_stay,
    })
}

/// Admissions handled by a doctor, newest first, split into open and total.
pub fn doctor_history(
    store: &dyn EntityStore,
    username: &str,
    now: NaiveDateTime,
) -> Result<DoctorHistory, ServiceError> {
    let doctor = store
        .doctor(username)?
        .ok_or_else(|| ServiceError::not_found("doctor", username))?;
    let admissions: Vec<AdmissionView> = store
        .admissions(&AdmissionFilter {
            doctor_username: Some(username.to_string()),
            ..Default::default()
        })?
        .into_iter()
        .map(|row| AdmissionView::new(row, now))
        .collect();
    let active_patients: Vec<AdmissionView> = admissions
        .iter()
        .filter(|a| a.admission.is_active())
        .cloned()
        .collect();

    Ok(DoctorHistory {
        doctor,
        total_patients: admissions.len() as u32,
        current_patients: active_patients.len() as u32,
        total_discharged: (admissions.len() - active_patients.len()) as u32,
        active_patients,
        admissions,
    })
}
