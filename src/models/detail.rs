use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Vitals reading attached to an admission. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionDetail {
    pub id: i64,
    pub admission_id: i64,
    #[serde(with = "crate::format::wire_timestamp")]
    pub recorded_at: NaiveDateTime,
    pub temperature: Option<f64>,
    pub blood_pressure: Option<String>,
    pub pulse_rate: Option<i64>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
    /// Display name of the recording doctor, when known.
    pub recorded_by_name: Option<String>,
}

/// Caller input for a vitals reading.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VitalsEntry {
    pub temperature: Option<f64>,
    pub blood_pressure: Option<String>,
    pub pulse_rate: Option<i64>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

/// Diagnosis record of an admission; one per admission, overwritten on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalDetail {
    pub id: i64,
    pub admission_id: i64,
    pub diagnosis: String,
    pub symptoms: String,
    pub treatment: String,
    pub medications: Option<String>,
    pub notes: Option<String>,
    #[serde(default, with = "crate::format::wire_timestamp::option")]
    pub next_checkup: Option<NaiveDateTime>,
    #[serde(with = "crate::format::wire_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::format::wire_timestamp")]
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicalDetailInput {
    pub diagnosis: Option<String>,
    pub symptoms: Option<String>,
    pub treatment: Option<String>,
    pub medications: Option<String>,
    pub notes: Option<String>,
    #[serde(default, with = "crate::format::wire_timestamp::option")]
    pub next_checkup: Option<NaiveDateTime>,
}

/// Medical detail fields after the mandatory ones have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalDetailFields {
    pub diagnosis: String,
    pub symptoms: String,
    pub treatment: String,
    pub medications: Option<String>,
    pub notes: Option<String>,
    pub next_checkup: Option<NaiveDateTime>,
}
