use rusqlite::{params, Connection, OptionalExtension};

use super::{is_foreign_key_violation, unique_or};
use crate::credentials::CredentialRecord;
use crate::db::DatabaseError;
use crate::models::{Doctor, DoctorUpdate};

/// Insert the credential row and the doctor row in one transaction.
pub fn insert_doctor(
    conn: &Connection,
    doctor: &Doctor,
    credential: &CredentialRecord,
) -> Result<Doctor, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO credentials (login_id, password_hash, salt) VALUES (?1, ?2, ?3)",
        params![credential.login_id, credential.password_hash, credential.salt],
    )
    .map_err(|e| unique_or(e, || format!("username '{}' is already taken", doctor.username)))?;
    tx.execute(
        "INSERT INTO doctors (username, name, email) VALUES (?1, ?2, ?3)",
        params![doctor.username, doctor.name, doctor.email],
    )?;
    tx.commit()?;
    Ok(doctor.clone())
}

pub fn get_doctor(conn: &Connection, username: &str) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        "SELECT username, name, email FROM doctors WHERE username = ?1",
        params![username],
        row_to_doctor,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT username, name, email FROM doctors ORDER BY name")?;
    let rows = stmt.query_map([], row_to_doctor)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_doctor(
    conn: &Connection,
    username: &str,
    update: &DoctorUpdate,
) -> Result<Doctor, DatabaseError> {
    let affected = conn.execute(
        "UPDATE doctors SET name = COALESCE(?2, name), email = COALESCE(?3, email)
         WHERE username = ?1",
        params![username, update.name, update.email],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("doctor", username));
    }
    get_doctor(conn, username)?.ok_or_else(|| DatabaseError::not_found("doctor", username))
}

/// Delete the doctor and its credential. `Conflict` while admissions reference it.
pub fn delete_doctor(conn: &Connection, username: &str) -> Result<(), DatabaseError> {
    let referenced = |e: rusqlite::Error| {
        if is_foreign_key_violation(&e) {
            DatabaseError::Conflict(format!("doctor '{username}' has admission records"))
        } else {
            DatabaseError::Sqlite(e)
        }
    };

    let tx = conn.unchecked_transaction()?;
    let affected = tx
        .execute("DELETE FROM doctors WHERE username = ?1", params![username])
        .map_err(referenced)?;
    if affected == 0 {
        return Err(DatabaseError::not_found("doctor", username));
    }
    tx.execute("DELETE FROM credentials WHERE login_id = ?1", params![username])?;
    tx.commit()?;
    Ok(())
}

pub fn get_credential(
    conn: &Connection,
    login_id: &str,
) -> Result<Option<CredentialRecord>, DatabaseError> {
    conn.query_row(
        "SELECT login_id, password_hash, salt FROM credentials WHERE login_id = ?1",
        params![login_id],
        |row| {
            Ok(CredentialRecord {
                login_id: row.get(0)?,
                password_hash: row.get(1)?,
                salt: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn count_doctors(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row("SELECT COUNT(*) FROM doctors", [], |row| row.get(0))
        .map_err(DatabaseError::from)
}

fn row_to_doctor(row: &rusqlite::Row) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        username: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}
