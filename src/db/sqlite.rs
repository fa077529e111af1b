//! Connection setup and schema migrations.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use super::DatabaseError;

struct Migration {
    version: i64,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("../../resources/migrations/001_initial.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("../../resources/migrations/002_admission_details.sql"),
    },
    Migration {
        version: 3,
        sql: include_str!("../../resources/migrations/003_single_active_admission.sql"),
    },
];

/// Open (creating parent directories as needed) and migrate the database
/// file at `path`.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DatabaseError::MigrationFailed {
            version: 0,
            reason: format!("cannot create {}: {e}", parent.display()),
        })?;
    }
    prepare(Connection::open(path)?)
}

/// Migrated in-memory database.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection, DatabaseError> {
    // busy_timeout first, so concurrent openers queue on the journal switch too.
    conn.execute_batch(
        "PRAGMA busy_timeout=5000;
         PRAGMA journal_mode=WAL;
         PRAGMA foreign_keys=ON;",
    )?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Apply every migration newer than the recorded schema version. Each
/// migration runs in its own transaction.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current = schema_version(conn)?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tracing::info!("Running migration v{}", migration.version);
        let failed = |e: rusqlite::Error| DatabaseError::MigrationFailed {
            version: migration.version,
            reason: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.commit().map_err(failed)?;
    }

    Ok(())
}

/// Highest applied migration, 0 on a fresh database.
pub fn schema_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !exists {
        return Ok(0);
    }
    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(version.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn fresh_database_has_full_schema() {
        let conn = open_memory_database().unwrap();
        assert_eq!(
            table_names(&conn),
            [
                "admission_details",
                "admission_types",
                "admissions",
                "credentials",
                "departments",
                "doctors",
                "medical_details",
                "patients",
                "schema_version",
            ]
        );
        assert_eq!(schema_version(&conn).unwrap(), 3);
    }

    #[test]
    fn rerunning_migrations_is_a_no_op() {
        let conn = open_memory_database().unwrap();
        run_migrations(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn blank_connection_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn foreign_keys_enforced() {
        let conn = open_memory_database().unwrap();
        let err = conn.execute(
            "INSERT INTO admissions (patient_id, department_id, doctor_username, admission_type_id,
                                     condition, admission_date, fee)
             VALUES (99, 99, 'ghost', 99, '', '2026-01-01 00:00:00', 0)",
            [],
        );
        assert!(err.is_err());
    }

    #[test]
    fn file_database_created_in_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("wardline.db");
        let conn = open_database(&path).unwrap();
        assert!(path.exists());
        assert_eq!(schema_version(&conn).unwrap(), 3);
    }
}
