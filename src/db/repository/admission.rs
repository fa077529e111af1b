use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior};

use super::{fmt_ts, is_foreign_key_violation, is_unique_violation, parse_opt_ts, parse_ts};
use crate::db::DatabaseError;
use crate::models::{Admission, AdmissionFilter, AdmissionRow, NewAdmission, StatusFilter};

const ADMISSION_COLUMNS: &str = "id, patient_id, department_id, doctor_username, admission_type_id,
     condition, admission_date, discharge_date, fee";

/// Insert an admission unless the patient already has an open one.
///
/// Check and insert share one IMMEDIATE transaction; the partial unique
/// index on open admissions rejects anything that slips past the check.
pub fn insert_admission(conn: &Connection, new: &NewAdmission) -> Result<Admission, DatabaseError> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    if let Some(open) = find_active_admission(&tx, new.patient_id)? {
        return Err(DatabaseError::Conflict(format!(
            "patient {} already has active admission {}",
            new.patient_id, open.id
        )));
    }

    tx.execute(
        "INSERT INTO admissions (patient_id, department_id, doctor_username, admission_type_id,
                                 condition, admission_date, discharge_date, fee)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)",
        params![
            new.patient_id,
            new.department_id,
            new.doctor_username,
            new.admission_type_id,
            new.condition,
            fmt_ts(&new.admission_date),
            new.fee,
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::Conflict(format!(
                "patient {} already has an active admission",
                new.patient_id
            ))
        } else if is_foreign_key_violation(&e) {
            DatabaseError::ConstraintViolation(
                "admission references a missing patient, department, doctor or admission type"
                    .into(),
            )
        } else {
            DatabaseError::Sqlite(e)
        }
    })?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    Ok(Admission {
        id,
        patient_id: new.patient_id,
        department_id: new.department_id,
        doctor_username: new.doctor_username.clone(),
        admission_type_id: new.admission_type_id,
        condition: new.condition.clone(),
        admission_date: new.admission_date,
        discharge_date: None,
        fee: new.fee,
    })
}

pub fn get_admission(conn: &Connection, id: i64) -> Result<Option<Admission>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = ?1"),
        params![id],
        row_to_admission,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn find_active_admission(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<Admission>, DatabaseError> {
    conn.query_row(
        &format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions
             WHERE patient_id = ?1 AND discharge_date IS NULL
             LIMIT 1"
        ),
        params![patient_id],
        row_to_admission,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Close an open admission. Returns false when no open admission has this id.
pub fn discharge_admission(
    conn: &Connection,
    id: i64,
    discharged_at: &chrono::NaiveDateTime,
    fee: Option<f64>,
) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE admissions
         SET discharge_date = ?2, fee = COALESCE(?3, fee)
         WHERE id = ?1 AND discharge_date IS NULL",
        params![id, fmt_ts(discharged_at), fee],
    )?;
    Ok(affected == 1)
}

/// Admissions joined with patient, department, doctor and type names,
/// newest first.
pub fn query_admissions(
    conn: &Connection,
    filter: &AdmissionFilter,
) -> Result<Vec<AdmissionRow>, DatabaseError> {
    let mut sql = String::from(
        "SELECT a.id, a.patient_id, p.name, a.department_id, d.name, a.doctor_username, doc.name,
                a.admission_type_id, t.name, a.condition, a.admission_date, a.discharge_date, a.fee
         FROM admissions a
         JOIN patients p ON p.id = a.patient_id
         JOIN departments d ON d.id = a.department_id
         JOIN doctors doc ON doc.username = a.doctor_username
         JOIN admission_types t ON t.id = a.admission_type_id
         WHERE 1 = 1",
    );
    let mut values: Vec<Value> = Vec::new();

    if let Some(id) = filter.admission_id {
        values.push(Value::Integer(id));
        sql.push_str(&format!(" AND a.id = ?{}", values.len()));
    }
    match filter.status {
        Some(StatusFilter::Active) => sql.push_str(" AND a.discharge_date IS NULL"),
        Some(StatusFilter::Discharged) => sql.push_str(" AND a.discharge_date IS NOT NULL"),
        None => {}
    }
    if let Some(dept) = filter.department_id {
        values.push(Value::Integer(dept));
        sql.push_str(&format!(" AND a.department_id = ?{}", values.len()));
    }
    if let Some(ref doctor) = filter.doctor_username {
        values.push(Value::Text(doctor.clone()));
        sql.push_str(&format!(" AND a.doctor_username = ?{}", values.len()));
    }
    if let Some(patient) = filter.patient_id {
        values.push(Value::Integer(patient));
        sql.push_str(&format!(" AND a.patient_id = ?{}", values.len()));
    }
    if let Some(lower) = filter.range.lower_bound() {
        values.push(Value::Text(fmt_ts(&lower)));
        sql.push_str(&format!(" AND a.admission_date >= ?{}", values.len()));
    }
    if let Some(upper) = filter.range.upper_bound() {
        values.push(Value::Text(fmt_ts(&upper)));
        sql.push_str(&format!(" AND a.admission_date < ?{}", values.len()));
    }
    sql.push_str(" ORDER BY a.admission_date DESC, a.id DESC");
    if let Some(limit) = filter.limit {
        values.push(Value::Integer(i64::from(limit)));
        sql.push_str(&format!(" LIMIT ?{}", values.len()));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok(AdmissionRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_name: row.get(2)?,
            department_id: row.get(3)?,
            department_name: row.get(4)?,
            doctor_username: row.get(5)?,
            doctor_name: row.get(6)?,
            admission_type_id: row.get(7)?,
            admission_type: row.get(8)?,
            condition: row.get(9)?,
            admission_date: parse_ts(10, &row.get::<_, String>(10)?)?,
            discharge_date: parse_opt_ts(11, row.get(11)?)?,
            fee: row.get::<_, Option<f64>>(12)?.unwrap_or(0.0),
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_admission(row: &rusqlite::Row) -> rusqlite::Result<Admission> {
    Ok(Admission {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        department_id: row.get(2)?,
        doctor_username: row.get(3)?,
        admission_type_id: row.get(4)?,
        condition: row.get(5)?,
        admission_date: parse_ts(6, &row.get::<_, String>(6)?)?,
        discharge_date: parse_opt_ts(7, row.get(7)?)?,
        fee: row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
    })
}
