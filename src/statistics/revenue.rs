use chrono::NaiveDateTime;

use crate::db::{EntityStore, StatisticsStore};
use crate::error::ServiceError;
use crate::format::{format_currency, round2};
use crate::models::Department;

use super::types::{Revenue, TimeWindow};

/// Fee total of admissions booked inside `window`.
pub fn revenue(store: &dyn EntityStore, window: &TimeWindow) -> Result<Revenue, ServiceError> {
    let total = round2(store.sum_fees(&window.start, &window.end, None)?);
    Ok(Revenue {
        total,
        formatted: format_currency(total),
    })
}

/// Current-month fees per department, in the order given.
pub(crate) fn month_revenue_by_department(
    store: &dyn EntityStore,
    departments: &[Department],
    now: NaiveDateTime,
) -> Result<Vec<f64>, ServiceError> {
    let window = TimeWindow::current_month(now);
    departments
        .iter()
        .map(|d| {
            store
                .sum_fees(&window.start, &window.end, Some(d.id))
                .map(round2)
                .map_err(ServiceError::from)
        })
        .collect()
}
