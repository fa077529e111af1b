//! Error taxonomy shared by the lifecycle, statistics, report and registry
//! operations.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(#[source] DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } => "NOT_FOUND",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Validation(_) => "VALIDATION",
            ServiceError::Internal(_) => "INTERNAL",
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => ServiceError::NotFound {
                entity: entity_label(&entity_type),
                id,
            },
            DatabaseError::Conflict(msg) => ServiceError::Conflict(msg),
            DatabaseError::ConstraintViolation(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Internal(other),
        }
    }
}

fn entity_label(entity_type: &str) -> &'static str {
    match entity_type {
        "patient" => "patient",
        "doctor" => "doctor",
        "department" => "department",
        "admission_type" => "admission type",
        "admission" => "admission",
        "medical_detail" => "medical detail",
        "admission_detail" => "admission detail",
        _ => "record",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_map_onto_taxonomy() {
        let nf: ServiceError = DatabaseError::not_found("department", 7).into();
        assert_eq!(nf.kind(), "NOT_FOUND");
        assert_eq!(nf.to_string(), "department 7 not found");

        let conflict: ServiceError = DatabaseError::Conflict("taken".into()).into();
        assert_eq!(conflict.kind(), "CONFLICT");

        let internal: ServiceError =
            DatabaseError::Sqlite(rusqlite::Error::InvalidQuery).into();
        assert_eq!(internal.kind(), "INTERNAL");
    }

    #[test]
    fn reference_vanishing_mid_write_is_conflict() {
        let err: ServiceError =
            DatabaseError::ConstraintViolation("admission references a missing patient".into()).into();
        assert_eq!(err.kind(), "CONFLICT");
    }

    #[test]
    fn internal_error_exposes_its_cause() {
        use std::error::Error;

        let err: ServiceError = DatabaseError::Sqlite(rusqlite::Error::InvalidQuery).into();
        let cause = err.source().expect("internal errors carry their cause");
        assert!(cause.downcast_ref::<DatabaseError>().is_some());
    }
}
