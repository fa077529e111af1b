use rusqlite::{params, Connection, OptionalExtension};

use super::{is_foreign_key_violation, unique_or};
use crate::db::DatabaseError;
use crate::models::Department;

pub fn insert_department(conn: &Connection, name: &str) -> Result<Department, DatabaseError> {
    conn.execute("INSERT INTO departments (name) VALUES (?1)", params![name])
        .map_err(|e| unique_or(e, || format!("department '{name}' already exists")))?;
    Ok(Department {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

pub fn get_department(conn: &Connection, id: i64) -> Result<Option<Department>, DatabaseError> {
    conn.query_row(
        "SELECT id, name FROM departments WHERE id = ?1",
        params![id],
        |row| Ok(Department { id: row.get(0)?, name: row.get(1)? }),
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM departments ORDER BY name")?;
    let rows = stmt.query_map([], |row| Ok(Department { id: row.get(0)?, name: row.get(1)? }))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn rename_department(conn: &Connection, id: i64, name: &str) -> Result<Department, DatabaseError> {
    let affected = conn
        .execute("UPDATE departments SET name = ?2 WHERE id = ?1", params![id, name])
        .map_err(|e| unique_or(e, || format!("department '{name}' already exists")))?;
    if affected == 0 {
        return Err(DatabaseError::not_found("department", id));
    }
    Ok(Department { id, name: name.to_string() })
}

pub fn delete_department(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn
        .execute("DELETE FROM departments WHERE id = ?1", params![id])
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DatabaseError::Conflict(format!("department {id} has admission records"))
            } else {
                DatabaseError::Sqlite(e)
            }
        })?;
    if affected == 0 {
        return Err(DatabaseError::not_found("department", id));
    }
    Ok(())
}

pub fn count_departments(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))
        .map_err(DatabaseError::from)
}
