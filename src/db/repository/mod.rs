//! Repository layer: table-scoped SQLite operations.
//!
//! Free functions over a borrowed `Connection`; `SqliteStore` wires them
//! into the store traits.

mod admission;
mod admission_type;
mod aggregate;
mod department;
mod detail;
mod doctor;
mod patient;

use chrono::{NaiveDate, NaiveDateTime};

use super::DatabaseError;
use crate::models::{DATE_FORMAT, TIMESTAMP_FORMAT};

pub use admission::*;
pub use admission_type::*;
pub use aggregate::*;
pub use department::*;
pub use detail::*;
pub use doctor::*;
pub use patient::*;

pub(crate) fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// True for UNIQUE / PRIMARY KEY violations.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Maps a uniqueness failure to `Conflict`, anything else stays a SQLite error.
pub(crate) fn unique_or(err: rusqlite::Error, message: impl FnOnce() -> String) -> DatabaseError {
    if is_unique_violation(&err) {
        DatabaseError::Conflict(message())
    } else {
        DatabaseError::Sqlite(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_timestamps_are_sortable_text() {
        let ts = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(7, 3, 9)
            .unwrap();
        assert_eq!(fmt_ts(&ts), "2026-01-05 07:03:09");
        assert_eq!(parse_ts(0, "2026-01-05 07:03:09").unwrap(), ts);
    }
}
