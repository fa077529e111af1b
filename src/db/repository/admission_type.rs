use rusqlite::{params, Connection, OptionalExtension};

use super::unique_or;
use crate::db::DatabaseError;
use crate::models::AdmissionType;

pub fn insert_admission_type(conn: &Connection, name: &str) -> Result<AdmissionType, DatabaseError> {
    conn.execute("INSERT INTO admission_types (name) VALUES (?1)", params![name])
        .map_err(|e| unique_or(e, || format!("admission type '{name}' already exists")))?;
    Ok(AdmissionType {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_admission_type(conn: &Connection, id: i64) -> Result<Option<AdmissionType>, DatabaseError> {
    conn.query_row(
        "SELECT id, name FROM admission_types WHERE id = ?1",
        params![id],
        |row| Ok(AdmissionType { id: row.get(0)?, name: row.get(1)? }),
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_admission_types(conn: &Connection) -> Result<Vec<AdmissionType>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM admission_types ORDER BY id")?;
    let rows = stmt.query_map([], |row| Ok(AdmissionType { id: row.get(0)?, name: row.get(1)? }))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
