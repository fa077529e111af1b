use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_ts, parse_opt_ts, parse_ts};
use crate::db::DatabaseError;
use crate::models::{AdmissionDetail, MedicalDetail, MedicalDetailFields, VitalsEntry};

pub fn insert_admission_detail(
    conn: &Connection,
    admission_id: i64,
    recorded_at: &NaiveDateTime,
    vitals: &VitalsEntry,
) -> Result<AdmissionDetail, DatabaseError> {
    conn.execute(
        "INSERT INTO admission_details
            (admission_id, recorded_at, temperature, blood_pressure, pulse_rate, notes, recorded_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            admission_id,
            fmt_ts(recorded_at),
            vitals.temperature,
            vitals.blood_pressure,
            vitals.pulse_rate,
            vitals.notes,
            vitals.recorded_by,
        ],
    )?;
    let id = conn.last_insert_rowid();
    list_admission_details(conn, admission_id)?
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DatabaseError::not_found("admission_detail", id))
}

/// Vitals history of one admission, newest first.
pub fn list_admission_details(
    conn: &Connection,
    admission_id: i64,
) -> Result<Vec<AdmissionDetail>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT ad.id, ad.admission_id, ad.recorded_at, ad.temperature, ad.blood_pressure,
                ad.pulse_rate, ad.notes, ad.recorded_by, doc.name
         FROM admission_details ad
         LEFT JOIN doctors doc ON doc.username = ad.recorded_by
         WHERE ad.admission_id = ?1
         ORDER BY ad.recorded_at DESC, ad.id DESC",
    )?;
    let rows = stmt.query_map(params![admission_id], |row| {
        Ok(AdmissionDetail {
            id: row.get(0)?,
            admission_id: row.get(1)?,
            recorded_at: parse_ts(2, &row.get::<_, String>(2)?)?,
            temperature: row.get(3)?,
            blood_pressure: row.get(4)?,
            pulse_rate: row.get(5)?,
            notes: row.get(6)?,
            recorded_by: row.get(7)?,
            recorded_by_name: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Create or overwrite the medical detail of an admission. `created_at`
/// survives overwrites; every other column takes the new value.
pub fn upsert_medical_detail(
    conn: &Connection,
    admission_id: i64,
    fields: &MedicalDetailFields,
    now: &NaiveDateTime,
) -> Result<MedicalDetail, DatabaseError> {
    let ts = fmt_ts(now);
    conn.execute(
        "INSERT INTO medical_details
            (admission_id, diagnosis, symptoms, treatment, medications, notes, next_checkup,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
         ON CONFLICT(admission_id) DO UPDATE SET
            diagnosis = excluded.diagnosis,
            symptoms = excluded.symptoms,
            treatment = excluded.treatment,
            medications = excluded.medications,
            notes = excluded.notes,
            next_checkup = excluded.next_checkup,
            updated_at = excluded.updated_at",
        params![
            admission_id,
            fields.diagnosis,
            fields.symptoms,
            fields.treatment,
            fields.medications,
            fields.notes,
            fields.next_checkup.as_ref().map(fmt_ts),
            ts,
        ],
    )?;
    get_medical_detail(conn, admission_id)?
        .ok_or_else(|| DatabaseError::not_found("medical_detail", admission_id))
}

pub fn get_medical_detail(
    conn: &Connection,
    admission_id: i64,
) -> Result<Option<MedicalDetail>, DatabaseError> {
    conn.query_row(
        "SELECT id, admission_id, diagnosis, symptoms, treatment, medications, notes,
                next_checkup, created_at, updated_at
         FROM medical_details WHERE admission_id = ?1",
        params![admission_id],
        |row| {
            Ok(MedicalDetail {
                id: row.get(0)?,
                admission_id: row.get(1)?,
                diagnosis: row.get(2)?,
                symptoms: row.get(3)?,
                treatment: row.get(4)?,
                medications: row.get(5)?,
                notes: row.get(6)?,
                next_checkup: parse_opt_ts(7, row.get(7)?)?,
                created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
                updated_at: parse_ts(9, &row.get::<_, String>(9)?)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}
