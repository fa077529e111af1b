//! Read-only aggregation queries behind the statistics and report modules.
//!
//! Windows are half-open `[from, until)` timestamp ranges. Absent fees
//! count as zero (`TOTAL` never yields NULL).

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

use super::{fmt_ts, parse_date};
use crate::db::DatabaseError;
use crate::models::{DateRange, DayTotals, GroupDimension, GroupRow};

/// Open admissions, hospital-wide or for one department.
pub fn count_active_admissions(
    conn: &Connection,
    department_id: Option<i64>,
) -> Result<u32, DatabaseError> {
    conn.query_row(
        "SELECT COUNT(*) FROM admissions
         WHERE discharge_date IS NULL AND (?1 IS NULL OR department_id = ?1)",
        params![department_id],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

pub fn count_admissions(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row("SELECT COUNT(*) FROM admissions", [], |row| row.get(0))
        .map_err(DatabaseError::from)
}

pub fn count_admissions_between(
    conn: &Connection,
    from: &NaiveDateTime,
    until: &NaiveDateTime,
) -> Result<u32, DatabaseError> {
    conn.query_row(
        "SELECT COUNT(*) FROM admissions WHERE admission_date >= ?1 AND admission_date < ?2",
        params![fmt_ts(from), fmt_ts(until)],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

/// Fee total of admissions booked inside the window.
pub fn sum_fees(
    conn: &Connection,
    from: &NaiveDateTime,
    until: &NaiveDateTime,
    department_id: Option<i64>,
) -> Result<f64, DatabaseError> {
    conn.query_row(
        "SELECT TOTAL(fee) FROM admissions
         WHERE admission_date >= ?1 AND admission_date < ?2
           AND (?3 IS NULL OR department_id = ?3)",
        params![fmt_ts(from), fmt_ts(until), department_id],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

/// Distinct patients with at least one admission inside the window.
pub fn count_patients_admitted_between(
    conn: &Connection,
    from: &NaiveDateTime,
    until: &NaiveDateTime,
) -> Result<u32, DatabaseError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT patient_id) FROM admissions
         WHERE admission_date >= ?1 AND admission_date < ?2",
        params![fmt_ts(from), fmt_ts(until)],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

pub fn count_doctors_with_active(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT doctor_username) FROM admissions WHERE discharge_date IS NULL",
        [],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

pub fn count_departments_with_active(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.query_row(
        "SELECT COUNT(DISTINCT department_id) FROM admissions WHERE discharge_date IS NULL",
        [],
        |row| row.get(0),
    )
    .map_err(DatabaseError::from)
}

/// Admission count and fee total per calendar day of admission, oldest
/// first. Days without admissions are absent; callers zero-fill.
pub fn daily_admission_totals(
    conn: &Connection,
    range: &DateRange,
) -> Result<Vec<DayTotals>, DatabaseError> {
    let mut sql = String::from(
        "SELECT date(admission_date) AS day, COUNT(*), TOTAL(fee)
         FROM admissions WHERE 1 = 1",
    );
    let mut values: Vec<Value> = Vec::new();
    if let Some(lower) = range.lower_bound() {
        values.push(Value::Text(fmt_ts(&lower)));
        sql.push_str(&format!(" AND admission_date >= ?{}", values.len()));
    }
    if let Some(upper) = range.upper_bound() {
        values.push(Value::Text(fmt_ts(&upper)));
        sql.push_str(&format!(" AND admission_date < ?{}", values.len()));
    }
    sql.push_str(" GROUP BY day ORDER BY day");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), |row| {
        Ok(DayTotals {
            date: parse_date(0, &row.get::<_, String>(0)?)?,
            count: row.get(1)?,
            revenue: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Count, open count and fee total per group.
///
/// With `include_empty` every row of the reference table appears, zero
/// counts included; otherwise only groups with at least one admission.
pub fn group_admissions(
    conn: &Connection,
    dimension: GroupDimension,
    include_empty: bool,
) -> Result<Vec<GroupRow>, DatabaseError> {
    let (source, key, label, on, order) = match dimension {
        GroupDimension::Department => ("departments g", "g.name", "g.name", "a.department_id = g.id", "g.name"),
        GroupDimension::Doctor => ("doctors g", "g.username", "g.name", "a.doctor_username = g.username", "g.name"),
        GroupDimension::AdmissionType => ("admission_types g", "g.name", "g.name", "a.admission_type_id = g.id", "g.id"),
    };
    let join = if include_empty { "LEFT JOIN" } else { "JOIN" };
    let sql = format!(
        "SELECT {key}, {label}, COUNT(a.id),
                COALESCE(SUM(CASE WHEN a.id IS NOT NULL AND a.discharge_date IS NULL THEN 1 ELSE 0 END), 0),
                TOTAL(a.fee)
         FROM {source}
         {join} admissions a ON {on}
         GROUP BY {key}
         ORDER BY {order}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(GroupRow {
            key: row.get(0)?,
            label: row.get(1)?,
            count: row.get(2)?,
            active_count: row.get(3)?,
            revenue: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
