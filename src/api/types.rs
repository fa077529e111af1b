//! Shared state and query types for the HTTP layer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::config::CapacityConfig;
use crate::db::SqliteStore;
use crate::models::{is_storable_date, DateRange, DATE_FORMAT, UNSTORABLE_DATE};

/// Shared context for all routes. Each request opens its own store.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
    pub capacity: CapacityConfig,
}

impl ApiContext {
    pub fn new(db_path: impl Into<PathBuf>, capacity: CapacityConfig) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
            capacity,
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Request-scoped store over a fresh connection.
    pub fn open_store(&self) -> Result<SqliteStore, ApiError> {
        SqliteStore::open(&self.db_path).map_err(ApiError::from)
    }
}

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn to_range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::new(
            parse_day("start_date", self.start_date.as_deref())?,
            parse_day("end_date", self.end_date.as_deref())?,
        ))
    }
}

pub(crate) fn parse_day(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => {
            let day = NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map_err(|_| ApiError::BadRequest(format!("{field} must be YYYY-MM-DD, got '{s}'")))?;
            if !is_storable_date(day) {
                return Err(ApiError::BadRequest(format!("{field}: {UNSTORABLE_DATE}")));
            }
            Ok(Some(day))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_query_parsing() {
        let q = DateRangeQuery {
            start_date: Some("2026-03-01".into()),
            end_date: Some("".into()),
        };
        let range = q.to_range().unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(range.end, None);

        let bad = DateRangeQuery {
            start_date: Some("03/01/2026".into()),
            end_date: None,
        };
        assert!(matches!(bad.to_range(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn five_digit_years_rejected() {
        assert!(matches!(
            parse_day("end_date", Some("+262142-12-31")),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(
            parse_day("end_date", Some("9999-12-31")).unwrap(),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
    }
}
