//! Reference registry: patients, doctors, departments and admission types.
//!
//! Deleting anything that still has an open admission is a conflict;
//! deleting something referenced only by closed admissions is a conflict
//! too, since admissions are never removed.

mod history;

pub use history::*;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::CapacityConfig;
use crate::credentials::CredentialRecord;
use crate::db::{AdmissionStore, EntityStore, ReferenceStore, StatisticsStore};
use crate::error::ServiceError;
use crate::models::{
    AdmissionFilter, AdmissionType, Department, Doctor, DoctorUpdate, GroupDimension, NewDoctor,
    NewPatient, Patient, PatientUpdate, StatusFilter,
};
use crate::statistics::{department_occupancy, DepartmentOccupancy};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientListing {
    pub id: i64,
    pub name: String,
    pub condition: Option<String>,
    /// "Admitted" or "Not Admitted".
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorListing {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub active_patients: u32,
    pub total_patients: u32,
}

// ── Patients ───────────────────────────────────────────────────────────────

pub fn add_patient(store: &dyn EntityStore, new: &NewPatient) -> Result<Patient, ServiceError> {
    let patient = store.insert_patient(&NewPatient {
        name: required("name", &new.name)?,
        condition: optional_text(&new.condition),
    })?;
    tracing::info!(patient_id = patient.id, "Patient registered");
    Ok(patient)
}

pub fn update_patient(
    store: &dyn EntityStore,
    id: i64,
    update: &PatientUpdate,
) -> Result<Patient, ServiceError> {
    let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
    Ok(store.update_patient(
        id,
        &PatientUpdate {
            name,
            condition: update.condition.clone(),
        },
    )?)
}

pub fn delete_patient(store: &dyn EntityStore, id: i64) -> Result<(), ServiceError> {
    if store.patient(id)?.is_none() {
        return Err(ServiceError::not_found("patient", id));
    }
    if let Some(open) = store.active_admission(id)? {
        return Err(ServiceError::Conflict(format!(
            "cannot delete patient {id} while admission {} is active",
            open.id
        )));
    }
    store.delete_patient(id)?;
    tracing::info!(patient_id = id, "Patient deleted");
    Ok(())
}

pub fn list_patients(store: &dyn EntityStore) -> Result<Vec<PatientListing>, ServiceError> {
    let admitted: HashSet<i64> = store
        .admissions(&AdmissionFilter {
            status: Some(StatusFilter::Active),
            ..Default::default()
        })?
        .into_iter()
        .map(|a| a.patient_id)
        .collect();

    Ok(store
        .patients()?
        .into_iter()
        .map(|p| PatientListing {
            status: if admitted.contains(&p.id) { "Admitted" } else { "Not Admitted" },
            id: p.id,
            name: p.name,
            condition: p.condition,
        })
        .collect())
}

// ── Doctors ────────────────────────────────────────────────────────────────

/// Register a doctor together with their login credential.
pub fn add_doctor(store: &dyn EntityStore, new: &NewDoctor) -> Result<Doctor, ServiceError> {
    let username = required("username", &new.username)?;
    let name = required("name", &new.name)?;
    if new.password.is_empty() {
        return Err(ServiceError::Validation("password is required".into()));
    }
    let doctor = Doctor {
        username: username.clone(),
        name,
        email: optional_text(&new.email),
    };
    let credential = CredentialRecord::new(&username, &new.password);
    let doctor = store.insert_doctor(&doctor, &credential)?;
    tracing::info!(username = %doctor.username, "Doctor registered");
    Ok(doctor)
}

pub fn update_doctor(
    store: &dyn EntityStore,
    username: &str,
    update: &DoctorUpdate,
) -> Result<Doctor, ServiceError> {
    let name = update.name.as_deref().map(|n| required("name", n)).transpose()?;
    Ok(store.update_doctor(
        username,
        &DoctorUpdate {
            name,
            email: update.email.clone(),
        },
    )?)
}

pub fn delete_doctor(store: &dyn EntityStore, username: &str) -> Result<(), ServiceError> {
    if store.doctor(username)?.is_none() {
        return Err(ServiceError::not_found("doctor", username));
    }
    let open = store.admissions(&AdmissionFilter {
        status: Some(StatusFilter::Active),
        doctor_username: Some(username.to_string()),
        limit: Some(1),
        ..Default::default()
    })?;
    if !open.is_empty() {
        return Err(ServiceError::Conflict(
            "cannot delete doctor with active patients".into(),
        ));
    }
    store.delete_doctor(username)?;
    tracing::info!(username, "Doctor deleted");
    Ok(())
}

pub fn list_doctors(store: &dyn EntityStore) -> Result<Vec<DoctorListing>, ServiceError> {
    let loads = store.group(GroupDimension::Doctor, true)?;
    Ok(store
        .doctors()?
        .into_iter()
        .map(|d| {
            let load = loads.iter().find(|g| g.key == d.username);
            DoctorListing {
                active_patients: load.map_or(0, |g| g.active_count),
                total_patients: load.map_or(0, |g| g.count),
                username: d.username,
                name: d.name,
                email: d.email,
            }
        })
        .collect())
}

// ── Departments & admission types ──────────────────────────────────────────

pub fn add_department(store: &dyn EntityStore, name: &str) -> Result<Department, ServiceError> {
    let department = store.insert_department(&required("name", name)?)?;
    tracing::info!(department_id = department.id, name = %department.name, "Department created");
    Ok(department)
}

pub fn rename_department(store: &dyn EntityStore, id: i64, name: &str) -> Result<Department, ServiceError> {
    Ok(store.rename_department(id, &required("name", name)?)?)
}

pub fn delete_department(store: &dyn EntityStore, id: i64) -> Result<(), ServiceError> {
    if store.department(id)?.is_none() {
        return Err(ServiceError::not_found("department", id));
    }
    if store.count_active(Some(id))? > 0 {
        return Err(ServiceError::Conflict(
            "cannot delete department with active patients".into(),
        ));
    }
    store.delete_department(id)?;
    tracing::info!(department_id = id, "Department deleted");
    Ok(())
}

/// Departments with open and total admissions, occupancy and this
/// month's revenue.
pub fn list_departments(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
    now: NaiveDateTime,
) -> Result<Vec<DepartmentOccupancy>, ServiceError> {
    department_occupancy(store, capacity, now)
}

pub fn add_admission_type(store: &dyn EntityStore, name: &str) -> Result<AdmissionType, ServiceError> {
    Ok(store.insert_admission_type(&required("name", name)?)?)
}

pub fn list_admission_types(store: &dyn EntityStore) -> Result<Vec<AdmissionType>, ServiceError> {
    Ok(store.admission_types()?)
}

fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ── Tests ──────────────────────────────────────────────────────────────────
