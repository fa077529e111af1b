use rusqlite::{params, Connection, OptionalExtension};

use super::is_foreign_key_violation;
use crate::db::DatabaseError;
use crate::models::{NewPatient, Patient, PatientUpdate};

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<Patient, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, condition) VALUES (?1, ?2)",
        params![patient.name, patient.condition],
    )?;
    Ok(Patient {
        id: conn.last_insert_rowid(),
        name: patient.name.clone(),
        condition: patient.condition.clone(),
    })
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, condition FROM patients WHERE id = ?1",
        params![id],
        row_to_patient,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, condition FROM patients ORDER BY id")?;
    let rows = stmt.query_map([], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let affected = conn.execute(
        "UPDATE patients
         SET name = COALESCE(?2, name), condition = COALESCE(?3, condition)
         WHERE id = ?1",
        params![id, update.name, update.condition],
    )?;
    if affected == 0 {
        return Err(DatabaseError::not_found("patient", id));
    }
    get_patient(conn, id)?.ok_or_else(|| DatabaseError::not_found("patient", id))
}

/// Delete a patient. Fails with `Conflict` while admissions reference it.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn
        .execute("DELETE FROM patients WHERE id = ?1", params![id])
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DatabaseError::Conflict(format!("patient {id} has admission records"))
            } else {
                DatabaseError::Sqlite(e)
            }
        })?;
    if affected == 0 {
        return Err(DatabaseError::not_found("patient", id));
    }
    Ok(())
}

pub fn count_patients(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
        .map_err(DatabaseError::from)
}

fn row_to_patient(row: &rusqlite::Row) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        condition: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let created = insert_patient(&conn, &NewPatient {
            name: "Test Patient".into(),
            condition: Some("Observation".into()),
        })
        .unwrap();
        let loaded = get_patient(&conn, created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[test]
    fn update_keeps_unset_fields() {
        let conn = open_memory_database().unwrap();
        let p = insert_patient(&conn, &NewPatient {
            name: "Ann".into(),
            condition: Some("Flu".into()),
        })
        .unwrap();
        let updated = update_patient(&conn, p.id, &PatientUpdate {
            name: Some("Ann Lee".into()),
            condition: None,
        })
        .unwrap();
        assert_eq!(updated.name, "Ann Lee");
        assert_eq!(updated.condition.as_deref(), Some("Flu"));
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_patient(&conn, 99, &PatientUpdate::default()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_referenced_patient_conflicts() {
        let conn = open_memory_database().unwrap();
        let seed = fixtures::seed(&conn);
        fixtures::admit(&conn, seed.patient_a, seed.cardiology, "dr.smith", seed.emergency, fixtures::days_ago(3), None, 100.0);

        let err = delete_patient(&conn, seed.patient_a).unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert!(get_patient(&conn, seed.patient_a).unwrap().is_some());
    }

    #[test]
    fn delete_unreferenced_patient() {
        let conn = open_memory_database().unwrap();
        let seed = fixtures::seed(&conn);
        delete_patient(&conn, seed.patient_b).unwrap();
        assert!(get_patient(&conn, seed.patient_b).unwrap().is_none());
        assert!(matches!(
            delete_patient(&conn, seed.patient_b),
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
