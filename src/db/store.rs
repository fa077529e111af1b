//! Store traits consumed by the domain modules, and their SQLite backing.
//!
//! Lifecycle, statistics and report code only ever see `&dyn EntityStore`,
//! so every operation can run against a fresh in-memory database in tests.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use super::{repository as repo, sqlite, DatabaseError};
use crate::credentials::CredentialRecord;
use crate::models::{
    Admission, AdmissionDetail, AdmissionFilter, AdmissionRow, AdmissionType, DateRange,
    DayTotals, Department, Doctor, DoctorUpdate, GroupDimension, GroupRow, MedicalDetail,
    MedicalDetailFields, NewAdmission, NewPatient, Patient, PatientUpdate, VitalsEntry,
};

/// Patients, doctors (with credentials), departments and admission types.
pub trait ReferenceStore {
    fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, DatabaseError>;
    fn patient(&self, id: i64) -> Result<Option<Patient>, DatabaseError>;
    fn patients(&self) -> Result<Vec<Patient>, DatabaseError>;
    fn update_patient(&self, id: i64, update: &PatientUpdate) -> Result<Patient, DatabaseError>;
    fn delete_patient(&self, id: i64) -> Result<(), DatabaseError>;
    fn count_patients(&self) -> Result<u32, DatabaseError>;

    fn insert_doctor(&self, doctor: &Doctor, credential: &CredentialRecord) -> Result<Doctor, DatabaseError>;
    fn doctor(&self, username: &str) -> Result<Option<Doctor>, DatabaseError>;
    fn doctors(&self) -> Result<Vec<Doctor>, DatabaseError>;
    fn update_doctor(&self, username: &str, update: &DoctorUpdate) -> Result<Doctor, DatabaseError>;
    fn delete_doctor(&self, username: &str) -> Result<(), DatabaseError>;
    fn credential(&self, login_id: &str) -> Result<Option<CredentialRecord>, DatabaseError>;
    fn count_doctors(&self) -> Result<u32, DatabaseError>;

    fn insert_department(&self, name: &str) -> Result<Department, DatabaseError>;
    fn department(&self, id: i64) -> Result<Option<Department>, DatabaseError>;
    fn departments(&self) -> Result<Vec<Department>, DatabaseError>;
    fn rename_department(&self, id: i64, name: &str) -> Result<Department, DatabaseError>;
    fn delete_department(&self, id: i64) -> Result<(), DatabaseError>;
    fn count_departments(&self) -> Result<u32, DatabaseError>;

    fn insert_admission_type(&self, name: &str) -> Result<AdmissionType, DatabaseError>;
    fn admission_type(&self, id: i64) -> Result<Option<AdmissionType>, DatabaseError>;
    fn admission_types(&self) -> Result<Vec<AdmissionType>, DatabaseError>;
}

/// Admissions and their child records.
pub trait AdmissionStore {
    /// Must reject a second open admission for the same patient with
    /// `DatabaseError::Conflict`, atomically with the insert.
    fn insert_admission(&self, new: &NewAdmission) -> Result<Admission, DatabaseError>;
    fn admission(&self, id: i64) -> Result<Option<Admission>, DatabaseError>;
    fn active_admission(&self, patient_id: i64) -> Result<Option<Admission>, DatabaseError>;
    /// Returns false when the admission is missing or already closed.
    fn discharge(&self, id: i64, at: &NaiveDateTime, fee: Option<f64>) -> Result<bool, DatabaseError>;
    fn admissions(&self, filter: &AdmissionFilter) -> Result<Vec<AdmissionRow>, DatabaseError>;

    fn insert_detail(
        &self,
        admission_id: i64,
        recorded_at: &NaiveDateTime,
        vitals: &VitalsEntry,
    ) -> Result<AdmissionDetail, DatabaseError>;
    fn details(&self, admission_id: i64) -> Result<Vec<AdmissionDetail>, DatabaseError>;
    fn upsert_medical_detail(
        &self,
        admission_id: i64,
        fields: &MedicalDetailFields,
        now: &NaiveDateTime,
    ) -> Result<MedicalDetail, DatabaseError>;
    fn medical_detail(&self, admission_id: i64) -> Result<Option<MedicalDetail>, DatabaseError>;
}

/// Aggregations over admissions. Windows are `[from, until)`.
pub trait StatisticsStore {
    fn count_active(&self, department_id: Option<i64>) -> Result<u32, DatabaseError>;
    fn count_admissions(&self) -> Result<u32, DatabaseError>;
    fn count_admissions_between(&self, from: &NaiveDateTime, until: &NaiveDateTime) -> Result<u32, DatabaseError>;
    fn sum_fees(
        &self,
        from: &NaiveDateTime,
        until: &NaiveDateTime,
        department_id: Option<i64>,
    ) -> Result<f64, DatabaseError>;
    fn count_patients_admitted_between(&self, from: &NaiveDateTime, until: &NaiveDateTime) -> Result<u32, DatabaseError>;
    fn count_doctors_with_active(&self) -> Result<u32, DatabaseError>;
    fn count_departments_with_active(&self) -> Result<u32, DatabaseError>;
    fn daily_totals(&self, range: &DateRange) -> Result<Vec<DayTotals>, DatabaseError>;
    fn group(&self, dimension: GroupDimension, include_empty: bool) -> Result<Vec<GroupRow>, DatabaseError>;
}

/// Everything the domain layer needs from persistence.
pub trait EntityStore: ReferenceStore + AdmissionStore + StatisticsStore {}

impl<T: ReferenceStore + AdmissionStore + StatisticsStore> EntityStore for T {}

/// `EntityStore` over one SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating and migrating as needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self { conn: sqlite::open_database(path)? })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self { conn: sqlite::open_memory_database()? })
    }

    /// Wrap an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ReferenceStore for SqliteStore {
    fn insert_patient(&self, patient: &NewPatient) -> Result<Patient, DatabaseError> {
        repo::insert_patient(&self.conn, patient)
    }
    fn patient(&self, id: i64) -> Result<Option<Patient>, DatabaseError> {
        repo::get_patient(&self.conn, id)
    }
    fn patients(&self) -> Result<Vec<Patient>, DatabaseError> {
        repo::list_patients(&self.conn)
    }
    fn update_patient(&self, id: i64, update: &PatientUpdate) -> Result<Patient, DatabaseError> {
        repo::update_patient(&self.conn, id, update)
    }
    fn delete_patient(&self, id: i64) -> Result<(), DatabaseError> {
        repo::delete_patient(&self.conn, id)
    }
    fn count_patients(&self) -> Result<u32, DatabaseError> {
        repo::count_patients(&self.conn)
    }

    fn insert_doctor(&self, doctor: &Doctor, credential: &CredentialRecord) -> Result<Doctor, DatabaseError> {
        repo::insert_doctor(&self.conn, doctor, credential)
    }
    fn doctor(&self, username: &str) -> Result<Option<Doctor>, DatabaseError> {
        repo::get_doctor(&self.conn, username)
    }
    fn doctors(&self) -> Result<Vec<Doctor>, DatabaseError> {
        repo::list_doctors(&self.conn)
    }
    fn update_doctor(&self, username: &str, update: &DoctorUpdate) -> Result<Doctor, DatabaseError> {
        repo::update_doctor(&self.conn, username, update)
    }
    fn delete_doctor(&self, username: &str) -> Result<(), DatabaseError> {
        repo::delete_doctor(&self.conn, username)
    }
    fn credential(&self, login_id: &str) -> Result<Option<CredentialRecord>, DatabaseError> {
        repo::get_credential(&self.conn, login_id)
    }
    fn count_doctors(&self) -> Result<u32, DatabaseError> {
        repo::count_doctors(&self.conn)
    }

    fn insert_department(&self, name: &str) -> Result<Department, DatabaseError> {
        repo::insert_department(&self.conn, name)
    }
    fn department(&self, id: i64) -> Result<Option<Department>, DatabaseError> {
        repo::get_department(&self.conn, id)
    }
    fn departments(&self) -> Result<Vec<Department>, DatabaseError> {
        repo::list_departments(&self.conn)
    }
    fn rename_department(&self, id: i64, name: &str) -> Result<Department, DatabaseError> {
        repo::rename_department(&self.conn, id, name)
    }
    fn delete_department(&self, id: i64) -> Result<(), DatabaseError> {
        repo::delete_department(&self.conn, id)
    }
    fn count_departments(&self) -> Result<u32, DatabaseError> {
        repo::count_departments(&self.conn)
    }

    fn insert_admission_type(&self, name: &str) -> Result<AdmissionType, DatabaseError> {
        repo::insert_admission_type(&self.conn, name)
    }
    fn admission_type(&self, id: i64) -> Result<Option<AdmissionType>, DatabaseError> {
        repo::get_admission_type(&self.conn, id)
    }
    fn admission_types(&self) -> Result<Vec<AdmissionType>, DatabaseError> {
        repo::list_admission_types(&self.conn)
    }
}

impl AdmissionStore for SqliteStore {
    fn insert_admission(&self, new: &NewAdmission) -> Result<Admission, DatabaseError> {
        repo::insert_admission(&self.conn, new)
    }
    fn admission(&self, id: i64) -> Result<Option<Admission>, DatabaseError> {
        repo::get_admission(&self.conn, id)
    }
    fn active_admission(&self, patient_id: i64) -> Result<Option<Admission>, DatabaseError> {
        repo::find_active_admission(&self.conn, patient_id)
    }
    fn discharge(&self, id: i64, at: &NaiveDateTime, fee: Option<f64>) -> Result<bool, DatabaseError> {
        repo::discharge_admission(&self.conn, id, at, fee)
    }
    fn admissions(&self, filter: &AdmissionFilter) -> Result<Vec<AdmissionRow>, DatabaseError> {
        repo::query_admissions(&self.conn, filter)
    }

    fn insert_detail(
        &self,
        admission_id: i64,
        recorded_at: &NaiveDateTime,
        vitals: &VitalsEntry,
    ) -> Result<AdmissionDetail, DatabaseError> {
        repo::insert_admission_detail(&self.conn, admission_id, recorded_at, vitals)
    }
    fn details(&self, admission_id: i64) -> Result<Vec<AdmissionDetail>, DatabaseError> {
        repo::list_admission_details(&self.conn, admission_id)
    }
    fn upsert_medical_detail(
        &self,
        admission_id: i64,
        fields: &MedicalDetailFields,
        now: &NaiveDateTime,
    ) -> Result<MedicalDetail, DatabaseError> {
        repo::upsert_medical_detail(&self.conn, admission_id, fields, now)
    }
    fn medical_detail(&self, admission_id: i64) -> Result<Option<MedicalDetail>, DatabaseError> {
        repo::get_medical_detail(&self.conn, admission_id)
    }
}

impl StatisticsStore for SqliteStore {
    fn count_active(&self, department_id: Option<i64>) -> Result<u32, DatabaseError> {
        repo::count_active_admissions(&self.conn, department_id)
    }
    fn count_admissions(&self) -> Result<u32, DatabaseError> {
        repo::count_admissions(&self.conn)
    }
    fn count_admissions_between(&self, from: &NaiveDateTime, until: &NaiveDateTime) -> Result<u32, DatabaseError> {
        repo::count_admissions_between(&self.conn, from, until)
    }
    fn sum_fees(
        &self,
        from: &NaiveDateTime,
        until: &NaiveDateTime,
        department_id: Option<i64>,
    ) -> Result<f64, DatabaseError> {
        repo::sum_fees(&self.conn, from, until, department_id)
    }
    fn count_patients_admitted_between(&self, from: &NaiveDateTime, until: &NaiveDateTime) -> Result<u32, DatabaseError> {
        repo::count_patients_admitted_between(&self.conn, from, until)
    }
    fn count_doctors_with_active(&self) -> Result<u32, DatabaseError> {
        repo::count_doctors_with_active(&self.conn)
    }
    fn count_departments_with_active(&self) -> Result<u32, DatabaseError> {
        repo::count_departments_with_active(&self.conn)
    }
    fn daily_totals(&self, range: &DateRange) -> Result<Vec<DayTotals>, DatabaseError> {
        repo::daily_admission_totals(&self.conn, range)
    }
    fn group(&self, dimension: GroupDimension, include_empty: bool) -> Result<Vec<GroupRow>, DatabaseError> {
        repo::group_admissions(&self.conn, dimension, include_empty)
    }
}
