//! Report builder: admissions, revenue and department reports, and the
//! recent-admissions feed.
//!
//! A report is all or nothing. Any store failure aborts the build and is
//! returned as `ServiceError::Internal` with the underlying cause.

mod types;

pub use types::*;

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::db::{AdmissionStore, DatabaseError, EntityStore, StatisticsStore};
use crate::error::ServiceError;
use crate::format::round2;
use crate::models::{AdmissionFilter, DateRange, GroupDimension, RecentWindow, UNSTORABLE_DATE};

pub const RECENT_LIMIT: u32 = 10;

/// Every admission in `range` (whole days, both ends inclusive) with
/// per-department and per-type breakdowns derived from those rows only.
pub fn admissions_report(
    store: &dyn EntityStore,
    range: &DateRange,
) -> Result<AdmissionsReport, ServiceError> {
    check_range(range)?;
    let filter = AdmissionFilter {
        range: *range,
        ..Default::default()
    };
    let admissions = store.admissions(&filter).map_err(internal)?;

    let mut per_department: BTreeMap<String, Breakdown> = BTreeMap::new();
    let mut per_admission_type: BTreeMap<String, Breakdown> = BTreeMap::new();
    let mut total_revenue = 0.0;
    let mut active_count = 0;

    for row in &admissions {
        total_revenue += row.fee;
        if row.is_active() {
            active_count += 1;
        }
        for slot in [
            per_department.entry(row.department_name.clone()).or_default(),
            per_admission_type.entry(row.admission_type.clone()).or_default(),
        ] {
            slot.count += 1;
            slot.revenue += row.fee;
            if row.is_active() {
                slot.active_count += 1;
            }
        }
    }
    for slot in per_department.values_mut().chain(per_admission_type.values_mut()) {
        slot.revenue = round2(slot.revenue);
    }

    tracing::debug!(rows = admissions.len(), "Admissions report built");
    Ok(AdmissionsReport {
        total_admissions: admissions.len() as u32,
        total_revenue: round2(total_revenue),
        active_count,
        per_department,
        per_admission_type,
        rows: admissions.into_iter().map(ReportRow::from).collect(),
    })
}

/// Admission count and fee total per calendar day of admission, oldest
/// first. Only days with admissions appear.
pub fn revenue_report(store: &dyn EntityStore, range: &DateRange) -> Result<RevenueReport, ServiceError> {
    check_range(range)?;
    let days = store.daily_totals(range).map_err(internal)?;
    let total_revenue = round2(days.iter().map(|d| d.revenue).sum());
    let total_admissions = days.iter().map(|d| d.count).sum();
    Ok(RevenueReport {
        total_revenue,
        total_admissions,
        daily_stats: days
            .into_iter()
            .map(|d| DailyRevenue {
                date: d.date,
                count: d.count,
                revenue: round2(d.revenue),
            })
            .collect(),
    })
}

/// One row per department, departments without admissions included.
pub fn department_report(store: &dyn EntityStore) -> Result<Vec<DepartmentReportRow>, ServiceError> {
    Ok(store
        .group(GroupDimension::Department, true)
        .map_err(internal)?
        .into_iter()
        .map(|g| DepartmentReportRow {
            department_name: g.label,
            total_admissions: g.count,
            active_count: g.active_count,
            total_revenue: round2(g.revenue),
        })
        .collect())
}

/// Latest admissions, newest first. `Week` reaches back seven days
/// before `today`.
pub fn recent_admissions(
    store: &dyn EntityStore,
    window: RecentWindow,
    today: NaiveDate,
    limit: Option<u32>,
) -> Result<Vec<RecentAdmission>, ServiceError> {
    let range = match window {
        RecentWindow::All => DateRange::default(),
        RecentWindow::Today => DateRange::new(Some(today), Some(today)),
        RecentWindow::Week => DateRange::new(Some(today - Duration::days(7)), None),
    };
    let filter = AdmissionFilter {
        range,
        limit: Some(limit.unwrap_or(RECENT_LIMIT)),
        ..Default::default()
    };
    Ok(store
        .admissions(&filter)?
        .into_iter()
        .map(|row| RecentAdmission {
            status: row.status(),
            id: row.id,
            patient_name: row.patient_name,
            department: row.department_name,
            doctor: row.doctor_name,
            admission_date: row.admission_date,
        })
        .collect())
}

fn check_range(range: &DateRange) -> Result<(), ServiceError> {
    if range.is_inverted() {
        return Err(ServiceError::Validation("start_date must not be after end_date".into()));
    }
    if !range.is_storable() {
        return Err(ServiceError::Validation(UNSTORABLE_DATE.into()));
    }
    Ok(())
}

fn internal(err: DatabaseError) -> ServiceError {
    tracing::error!(error = %err, "Report query failed");
    ServiceError::Internal(err)
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, at, seeded_store, Seed};
    use crate::db::SqliteStore;

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 3, d)
    }

    fn populated() -> (SqliteStore, Seed) {
        let (store, seed) = seeded_store();
        let conn = store.connection();
        fixtures::admit(conn, seed.patient_a, seed.cardiology, "dr.smith", seed.emergency, at(2026, 3, 1, 8), Some(at(2026, 3, 2, 8)), 1000.0);
        fixtures::admit(conn, seed.patient_b, seed.cardiology, "dr.jones", seed.planned, at(2026, 3, 1, 20), None, 500.5);
        fixtures::admit(conn, seed.patient_a, seed.orthopedics, "dr.smith", seed.planned, at(2026, 3, 5, 23), None, 0.0);
        fixtures::admit(conn, seed.patient_c, seed.orthopedics, "dr.jones", seed.emergency, at(2026, 2, 10, 9), Some(at(2026, 2, 12, 9)), 250.0);
        (store, seed)
    }

    #[test]
    fn admissions_report_totals_and_breakdowns() {
        let (store, _) = populated();
        let report = admissions_report(&store, &DateRange::new(day(1), day(5))).unwrap();

        assert_eq!(report.total_admissions, 3);
        assert_eq!(report.total_revenue, 1500.5);
        assert_eq!(report.active_count, 2);

        let cardio = &report.per_department["Cardiology"];
        assert_eq!((cardio.count, cardio.active_count, cardio.revenue), (2, 1, 1500.5));
        assert!(!report.per_department.contains_key("Pediatrics"));
        assert_eq!(report.per_admission_type["Planned Surgery"].count, 2);

        // End day is inclusive: the 23:00 admission on the 5th is present.
        assert_eq!(report.rows[0].admission_date, at(2026, 3, 5, 23));
        assert_eq!(report.rows[0].department, "Orthopedics");
    }

    #[test]
    fn admissions_report_without_range_covers_everything() {
        let (store, _) = populated();
        let report = admissions_report(&store, &DateRange::default()).unwrap();
        assert_eq!(report.total_admissions, 4);
        assert_eq!(report.total_revenue, 1750.5);
    }

    #[test]
    fn report_rows_serialize_with_wire_names() {
        let (store, _) = populated();
        let report = admissions_report(&store, &DateRange::new(day(1), day(1))).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["active_admissions"], 1);
        assert_eq!(json["department_stats"]["Cardiology"]["active"], 1);
        let row = &json["admissions"][1];
        assert_eq!(row["patient_name"], "James Wilson");
        assert_eq!(row["doctor"], "Dr. John Smith");
        assert_eq!(row["type"], "Emergency");
        assert_eq!(row["admission_date"], "2026-03-01 08:00:00");
        assert_eq!(row["discharge_date"], "2026-03-02 08:00:00");
        assert_eq!(row["fee"], 1000.0);
        assert_eq!(row["status"], "Discharged");
    }

    #[test]
    fn inverted_range_is_validation_error() {
        let (store, _) = populated();
        let err = admissions_report(&store, &DateRange::new(day(5), day(1))).unwrap_err();
        assert_eq!(err.kind(), "VALIDATION");
        assert_eq!(revenue_report(&store, &DateRange::new(day(5), day(1))).unwrap_err().kind(), "VALIDATION");
    }

    #[test]
    fn dates_beyond_year_9999_are_rejected() {
        let (store, _) = populated();
        let far = DateRange::new(None, Some(NaiveDate::MAX));
        assert_eq!(admissions_report(&store, &far).unwrap_err().kind(), "VALIDATION");
        assert_eq!(revenue_report(&store, &far).unwrap_err().kind(), "VALIDATION");
    }

    #[test]
    fn last_storable_day_leaves_range_open() {
        let (store, _) = populated();
        let range = DateRange::new(day(1), NaiveDate::from_ymd_opt(9999, 12, 31));
        assert_eq!(admissions_report(&store, &range).unwrap().total_admissions, 3);
        assert_eq!(revenue_report(&store, &range).unwrap().total_admissions, 3);
    }

    #[test]
    fn revenue_report_groups_by_day() {
        let (store, _) = populated();
        let report = revenue_report(&store, &DateRange::new(day(1), None)).unwrap();
        assert_eq!(report.total_admissions, 3);
        assert_eq!(report.total_revenue, 1500.5);
        assert_eq!(report.daily_stats.len(), 2);
        assert_eq!(report.daily_stats[0].date, day(1).unwrap());
        assert_eq!((report.daily_stats[0].count, report.daily_stats[0].revenue), (2, 1500.5));
        assert_eq!((report.daily_stats[1].count, report.daily_stats[1].revenue), (1, 0.0));
    }

    #[test]
    fn department_report_keeps_empty_departments() {
        let (store, _) = populated();
        let rows = department_report(&store).unwrap();
        assert_eq!(rows.len(), 3);
        let peds = rows.iter().find(|r| r.department_name == "Pediatrics").unwrap();
        assert_eq!((peds.total_admissions, peds.active_count, peds.total_revenue), (0, 0, 0.0));
        let ortho = rows.iter().find(|r| r.department_name == "Orthopedics").unwrap();
        assert_eq!((ortho.total_admissions, ortho.active_count, ortho.total_revenue), (2, 1, 250.0));
    }

    #[test]
    fn store_failure_surfaces_as_internal() {
        let (store, _) = populated();
        store
            .connection()
            .execute_batch("PRAGMA foreign_keys=OFF; DROP TABLE admission_types;")
            .unwrap();

        assert!(matches!(admissions_report(&store, &DateRange::default()), Err(ServiceError::Internal(_))));
        store.connection().execute_batch("DROP TABLE medical_details; DROP TABLE admission_details; DROP TABLE admissions;").unwrap();
        assert!(matches!(revenue_report(&store, &DateRange::default()), Err(ServiceError::Internal(_))));
        assert!(matches!(department_report(&store), Err(ServiceError::Internal(_))));
    }

    #[test]
    fn recent_feed_windows() {
        let (store, seed) = seeded_store();
        let conn = store.connection();
        fixtures::admit(conn, seed.patient_a, seed.cardiology, "dr.smith", seed.emergency, at(2026, 3, 10, 9), None, 0.0);
        fixtures::admit(conn, seed.patient_b, seed.cardiology, "dr.smith", seed.emergency, at(2026, 3, 4, 9), None, 0.0);
        fixtures::admit(conn, seed.patient_c, seed.cardiology, "dr.smith", seed.emergency, at(2026, 3, 1, 9), None, 0.0);
        let today = day(10).unwrap();

        let all = recent_admissions(&store, RecentWindow::All, today, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].patient_name, "James Wilson");

        assert_eq!(recent_admissions(&store, RecentWindow::Today, today, None).unwrap().len(), 1);
        assert_eq!(recent_admissions(&store, RecentWindow::Week, today, None).unwrap().len(), 2);
        assert_eq!(recent_admissions(&store, RecentWindow::All, today, Some(1)).unwrap().len(), 1);
    }
}
