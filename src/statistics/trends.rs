use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::db::{EntityStore, StatisticsStore};
use crate::error::ServiceError;
use crate::format::round1;
use crate::models::DateRange;

use super::types::DailyCount;

/// Percent change from `previous` to `current`, one decimal. A zero
/// baseline yields 0 rather than an infinite change.
pub fn trend(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    round1((current - previous) / previous * 100.0)
}

/// Admissions per calendar day for the `days` days ending with `today`,
/// oldest first. Every day appears, zero when nothing was admitted.
pub fn daily_series(
    store: &dyn EntityStore,
    today: NaiveDate,
    days: u32,
) -> Result<Vec<DailyCount>, ServiceError> {
    if days == 0 {
        return Ok(Vec::new());
    }
    let first = today - Duration::days(i64::from(days) - 1);
    let counts: HashMap<NaiveDate, u32> = store
        .daily_totals(&DateRange::new(Some(first), Some(today)))?
        .into_iter()
        .map(|d| (d.date, d.count))
        .collect();

    Ok(first
        .iter_days()
        .take(days as usize)
        .map(|date| DailyCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect())
}
