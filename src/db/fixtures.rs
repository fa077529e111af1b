//! Shared seed data for repository and domain tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};

use super::repository::fmt_ts;
use super::sqlite::open_memory_database;
use super::store::SqliteStore;

pub struct Seed {
    pub cardiology: i64,
    pub orthopedics: i64,
    pub pediatrics: i64,
    pub emergency: i64,
    pub planned: i64,
    pub patient_a: i64,
    pub patient_b: i64,
    pub patient_c: i64,
}

/// Two doctors, three departments (Pediatrics stays empty), two admission
/// types and three patients.
pub fn seed(conn: &Connection) -> Seed {
    for (login, name, email) in [
        ("dr.smith", "Dr. John Smith", "smith@hospital.com"),
        ("dr.jones", "Dr. Sarah Jones", "jones@hospital.com"),
    ] {
        conn.execute(
            "INSERT INTO credentials (login_id, password_hash, salt) VALUES (?1, 'x', 'x')",
            params![login],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO doctors (username, name, email) VALUES (?1, ?2, ?3)",
            params![login, name, email],
        )
        .unwrap();
    }

    let dept = |name: &str| {
        conn.execute("INSERT INTO departments (name) VALUES (?1)", params![name])
            .unwrap();
        conn.last_insert_rowid()
    };
    let cardiology = dept("Cardiology");
    let orthopedics = dept("Orthopedics");
    let pediatrics = dept("Pediatrics");

    let kind = |name: &str| {
        conn.execute("INSERT INTO admission_types (name) VALUES (?1)", params![name])
            .unwrap();
        conn.last_insert_rowid()
    };
    let emergency = kind("Emergency");
    let planned = kind("Planned Surgery");

    let patient = |name: &str, condition: &str| {
        conn.execute(
            "INSERT INTO patients (name, condition) VALUES (?1, ?2)",
            params![name, condition],
        )
        .unwrap();
        conn.last_insert_rowid()
    };
    let patient_a = patient("James Wilson", "Hypertension and mild chest pain");
    let patient_b = patient("Maria Garcia", "Fractured right femur");
    let patient_c = patient("Test Patient", "Observation");

    Seed {
        cardiology,
        orthopedics,
        pediatrics,
        emergency,
        planned,
        patient_a,
        patient_b,
        patient_c,
    }
}

/// Migrated in-memory store with the standard seed applied.
pub fn seeded_store() -> (SqliteStore, Seed) {
    let conn = open_memory_database().expect("Failed to open test DB");
    let seed = seed(&conn);
    (SqliteStore::from_connection(conn), seed)
}

/// Insert an admission row directly, bypassing lifecycle checks.
#[allow(clippy::too_many_arguments)]
pub fn admit(
    conn: &Connection,
    patient_id: i64,
    department_id: i64,
    doctor: &str,
    admission_type_id: i64,
    admitted: NaiveDateTime,
    discharged: Option<NaiveDateTime>,
    fee: f64,
) -> i64 {
    conn.execute(
        "INSERT INTO admissions (patient_id, department_id, doctor_username, admission_type_id,
                                 condition, admission_date, discharge_date, fee)
         VALUES (?1, ?2, ?3, ?4, 'seeded', ?5, ?6, ?7)",
        params![
            patient_id,
            department_id,
            doctor,
            admission_type_id,
            fmt_ts(&admitted),
            discharged.map(|d| fmt_ts(&d)),
            fee,
        ],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn now() -> NaiveDateTime {
    crate::models::utc_now()
}

pub fn days_ago(days: i64) -> NaiveDateTime {
    now() - Duration::days(days)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}
