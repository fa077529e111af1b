//! Admission lifecycle: admit, discharge, and the child records attached
//! to an admission (vitals history and the medical detail).
//!
//! Every operation has an `_at` variant taking the clock reading
//! explicitly; the plain variants use the current UTC time.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::{AdmissionStore, EntityStore, ReferenceStore};
use crate::error::ServiceError;
use crate::models::{
    utc_now, Admission, AdmissionDetail, AdmissionFilter, AdmissionRequest, AdmissionRow,
    AdmissionStatus, MedicalDetail, MedicalDetailFields, MedicalDetailInput, NewAdmission,
    VitalsEntry, UNSTORABLE_DATE,
};

/// Fully joined admission with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionView {
    #[serde(flatten)]
    pub admission: AdmissionRow,
    pub status: AdmissionStatus,
    pub length_of_stay: i64,
}

impl AdmissionView {
    pub fn new(admission: AdmissionRow, now: NaiveDateTime) -> Self {
        let length_of_stay =
            crate::models::length_of_stay(admission.admission_date, admission.discharge_date, now);
        Self {
            status: admission.status(),
            admission,
            length_of_stay,
        }
    }
}

/// Medical detail as presented; empty fields when none has been recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MedicalDetailView {
    pub admission_id: i64,
    pub diagnosis: String,
    pub symptoms: String,
    pub treatment: String,
    pub medications: String,
    pub notes: String,
    #[serde(with = "crate::format::wire_timestamp::option")]
    pub next_checkup: Option<NaiveDateTime>,
    #[serde(with = "crate::format::wire_timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl From<MedicalDetail> for MedicalDetailView {
    fn from(d: MedicalDetail) -> Self {
        Self {
            admission_id: d.admission_id,
            diagnosis: d.diagnosis,
            symptoms: d.symptoms,
            treatment: d.treatment,
            medications: d.medications.unwrap_or_default(),
            notes: d.notes.unwrap_or_default(),
            next_checkup: d.next_checkup,
            updated_at: Some(d.updated_at),
        }
    }
}

pub fn create_admission(
    store: &dyn EntityStore,
    request: &AdmissionRequest,
) -> Result<Admission, ServiceError> {
    create_admission_at(store, request, utc_now())
}

/// Admit a patient. All four references must exist and the patient must
/// not already be admitted.
pub fn create_admission_at(
    store: &dyn EntityStore,
    request: &AdmissionRequest,
    now: NaiveDateTime,
) -> Result<Admission, ServiceError> {
    if store.patient(request.patient_id)?.is_none() {
        return Err(ServiceError::not_found("patient", request.patient_id));
    }
    if store.department(request.department_id)?.is_none() {
        return Err(ServiceError::not_found("department", request.department_id));
    }
    if store.doctor(&request.doctor_username)?.is_none() {
        return Err(ServiceError::not_found("doctor", &request.doctor_username));
    }
    if store.admission_type(request.admission_type_id)?.is_none() {
        return Err(ServiceError::not_found("admission type", request.admission_type_id));
    }
    let fee = validate_fee(request.fee.unwrap_or(0.0))?;

    if let Some(open) = store.active_admission(request.patient_id)? {
        tracing::warn!(
            patient_id = request.patient_id,
            admission_id = open.id,
            "Admission rejected: patient already admitted"
        );
        return Err(ServiceError::Conflict(format!(
            "patient {} already has an active admission ({})",
            request.patient_id, open.id
        )));
    }

    let admission = store.insert_admission(&NewAdmission {
        patient_id: request.patient_id,
        department_id: request.department_id,
        doctor_username: request.doctor_username.clone(),
        admission_type_id: request.admission_type_id,
        condition: request.condition.trim().to_string(),
        admission_date: now,
        fee,
    })?;

    tracing::info!(
        admission_id = admission.id,
        patient_id = admission.patient_id,
        department_id = admission.department_id,
        "Patient admitted"
    );
    Ok(admission)
}

pub fn discharge_admission(
    store: &dyn EntityStore,
    admission_id: i64,
    fee: Option<f64>,
) -> Result<Admission, ServiceError> {
    discharge_admission_at(store, admission_id, fee, utc_now())
}

/// Close an admission. Not idempotent: a second discharge is a conflict.
/// Without a fee override the stored fee is kept.
pub fn discharge_admission_at(
    store: &dyn EntityStore,
    admission_id: i64,
    fee: Option<f64>,
    now: NaiveDateTime,
) -> Result<Admission, ServiceError> {
    let admission = store
        .admission(admission_id)?
        .ok_or_else(|| ServiceError::not_found("admission", admission_id))?;
    if !admission.is_active() {
        tracing::warn!(admission_id, "Discharge rejected: already discharged");
        return Err(already_discharged(admission_id));
    }
    let fee = fee.map(validate_fee).transpose()?;

    // Clock skew must not produce a discharge before the admission.
    let discharged_at = now.max(admission.admission_date);
    if !store.discharge(admission_id, &discharged_at, fee)? {
        return Err(already_discharged(admission_id));
    }

    let updated = store
        .admission(admission_id)?
        .ok_or_else(|| ServiceError::not_found("admission", admission_id))?;
    tracing::info!(
        admission_id,
        length_of_stay = updated.length_of_stay(discharged_at),
        "Patient discharged"
    );
    Ok(updated)
}

pub fn attach_detail(
    store: &dyn EntityStore,
    admission_id: i64,
    vitals: &VitalsEntry,
) -> Result<AdmissionDetail, ServiceError> {
    attach_detail_at(store, admission_id, vitals, utc_now())
}

/// Append a vitals reading. Earlier readings are never touched.
pub fn attach_detail_at(
    store: &dyn EntityStore,
    admission_id: i64,
    vitals: &VitalsEntry,
    now: NaiveDateTime,
) -> Result<AdmissionDetail, ServiceError> {
    require_admission(store, admission_id)?;
    if let Some(ref username) = vitals.recorded_by {
        if store.doctor(username)?.is_none() {
            return Err(ServiceError::not_found("doctor", username));
        }
    }
    if matches!(vitals.temperature, Some(t) if !t.is_finite()) {
        return Err(ServiceError::Validation("temperature must be a number".into()));
    }
    if matches!(vitals.pulse_rate, Some(p) if p < 0) {
        return Err(ServiceError::Validation("pulse rate cannot be negative".into()));
    }

    let detail = store.insert_detail(admission_id, &now, vitals)?;
    tracing::debug!(admission_id, detail_id = detail.id, "Vitals recorded");
    Ok(detail)
}

/// Vitals history, newest first.
pub fn list_details(
    store: &dyn EntityStore,
    admission_id: i64,
) -> Result<Vec<AdmissionDetail>, ServiceError> {
    require_admission(store, admission_id)?;
    Ok(store.details(admission_id)?)
}

pub fn upsert_medical_detail(
    store: &dyn EntityStore,
    admission_id: i64,
    input: &MedicalDetailInput,
) -> Result<MedicalDetail, ServiceError> {
    upsert_medical_detail_at(store, admission_id, input, utc_now())
}

/// Create or overwrite the medical detail. Diagnosis, symptoms and
/// treatment are mandatory; no history is kept.
pub fn upsert_medical_detail_at(
    store: &dyn EntityStore,
    admission_id: i64,
    input: &MedicalDetailInput,
    now: NaiveDateTime,
) -> Result<MedicalDetail, ServiceError> {
    let fields = validate_medical_detail(input)?;
    require_admission(store, admission_id)?;
    let detail = store.upsert_medical_detail(admission_id, &fields, &now)?;
    tracing::info!(admission_id, "Medical details updated");
    Ok(detail)
}

pub fn medical_detail(
    store: &dyn EntityStore,
    admission_id: i64,
) -> Result<MedicalDetailView, ServiceError> {
    require_admission(store, admission_id)?;
    Ok(store
        .medical_detail(admission_id)?
        .map(MedicalDetailView::from)
        .unwrap_or_else(|| MedicalDetailView {
            admission_id,
            ..Default::default()
        }))
}

pub fn admission_view(
    store: &dyn EntityStore,
    admission_id: i64,
    now: NaiveDateTime,
) -> Result<AdmissionView, ServiceError> {
    let filter = AdmissionFilter {
        admission_id: Some(admission_id),
        ..Default::default()
    };
    store
        .admissions(&filter)?
        .into_iter()
        .next()
        .map(|row| AdmissionView::new(row, now))
        .ok_or_else(|| ServiceError::not_found("admission", admission_id))
}

/// Filtered admissions, newest first.
pub fn list_admissions(
    store: &dyn EntityStore,
    filter: &AdmissionFilter,
    now: NaiveDateTime,
) -> Result<Vec<AdmissionView>, ServiceError> {
    if filter.range.is_inverted() {
        return Err(ServiceError::Validation("start date is after end date".into()));
    }
    if !filter.range.is_storable() {
        return Err(ServiceError::Validation(UNSTORABLE_DATE.into()));
    }
    Ok(store
        .admissions(filter)?
        .into_iter()
        .map(|row| AdmissionView::new(row, now))
        .collect())
}

fn require_admission(store: &dyn EntityStore, admission_id: i64) -> Result<Admission, ServiceError> {
    store
        .admission(admission_id)?
        .ok_or_else(|| ServiceError::not_found("admission", admission_id))
}

fn already_discharged(admission_id: i64) -> ServiceError {
    ServiceError::Conflict(format!("admission {admission_id} is already discharged"))
}

fn validate_fee(fee: f64) -> Result<f64, ServiceError> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(ServiceError::Validation(format!(
            "fee must be a non-negative amount, got {fee}"
        )));
    }
    Ok(fee)
}

fn validate_medical_detail(input: &MedicalDetailInput) -> Result<MedicalDetailFields, ServiceError> {
    fn non_blank(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    let diagnosis = non_blank(&input.diagnosis);
    let symptoms = non_blank(&input.symptoms);
    let treatment = non_blank(&input.treatment);

    match (diagnosis, symptoms, treatment) {
        (Some(diagnosis), Some(symptoms), Some(treatment)) => Ok(MedicalDetailFields {
            diagnosis,
            symptoms,
            treatment,
            medications: non_blank(&input.medications),
            notes: non_blank(&input.notes),
            next_checkup: input.next_checkup,
        }),
        (d, s, t) => {
            let missing: Vec<&str> = [("diagnosis", d.is_none()), ("symptoms", s.is_none()), ("treatment", t.is_none())]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
            Err(ServiceError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────
