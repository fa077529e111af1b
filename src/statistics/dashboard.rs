use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::CapacityConfig;
use crate::db::{EntityStore, ReferenceStore, StatisticsStore};
use crate::error::ServiceError;
use crate::models::GroupDimension;

use super::occupancy::{bed_statistics, occupancy_ratio};
use super::revenue::revenue;
use super::trends::{daily_series, trend};
use super::types::*;

pub fn dashboard_overview(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
) -> Result<DashboardOverview, ServiceError> {
    let beds = bed_statistics(store, capacity)?;
    Ok(DashboardOverview {
        patients: ActiveCount {
            total: store.count_patients()?,
            active: beds.occupied,
        },
        doctors: ActiveCount {
            total: store.count_doctors()?,
            active: store.count_doctors_with_active()?,
        },
        departments: ActiveCount {
            total: store.count_departments()?,
            active: store.count_departments_with_active()?,
        },
        beds,
    })
}

/// Revenue for the month of `now`, the seven days ending today, and
/// occupancy per department.
pub fn dashboard_stats(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
    now: NaiveDateTime,
) -> Result<DashboardStats, ServiceError> {
    let revenue = revenue(store, &TimeWindow::current_month(now))?;
    let admission_trends = daily_series(store, now.date(), 7)?;
    let department_occupancy = store
        .departments()?
        .into_iter()
        .map(|d| {
            let active = store.count_active(Some(d.id))?;
            Ok(DepartmentLoad {
                name: d.name,
                occupancy: occupancy_ratio(active, capacity.beds_per_department),
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    Ok(DashboardStats {
        revenue,
        admission_trends,
        department_occupancy,
    })
}

/// Total patients, and the change in distinct admitted patients between
/// this month and last.
pub fn patient_statistics(
    store: &dyn EntityStore,
    now: NaiveDateTime,
) -> Result<PatientStatistics, ServiceError> {
    let current = TimeWindow::current_month(now);
    let previous = TimeWindow::previous_month(now);
    let this_month = store.count_patients_admitted_between(&current.start, &current.end)?;
    let last_month = store.count_patients_admitted_between(&previous.start, &previous.end)?;
    Ok(PatientStatistics {
        total: store.count_patients()?,
        trend: trend(f64::from(this_month), f64::from(last_month)),
    })
}

/// Open admissions, admissions booked today, and the change from yesterday.
pub fn admission_statistics(
    store: &dyn EntityStore,
    today: NaiveDate,
) -> Result<AdmissionStatistics, ServiceError> {
    let today_window = TimeWindow::day(today);
    let yesterday_window = TimeWindow::day(today - Duration::days(1));
    let today_count = store.count_admissions_between(&today_window.start, &today_window.end)?;
    let yesterday_count = store.count_admissions_between(&yesterday_window.start, &yesterday_window.end)?;
    Ok(AdmissionStatistics {
        active: store.count_active(None)?,
        today: today_count,
        trend: trend(f64::from(today_count), f64::from(yesterday_count)),
    })
}

pub fn revenue_statistics(
    store: &dyn EntityStore,
    now: NaiveDateTime,
) -> Result<RevenueStatistics, ServiceError> {
    let current = revenue(store, &TimeWindow::current_month(now))?;
    let previous = revenue(store, &TimeWindow::previous_month(now))?;
    Ok(RevenueStatistics {
        trend: trend(current.total, previous.total),
        monthly: current.total,
        formatted: current.formatted,
    })
}

/// Doctor head count, how many have open admissions, and each doctor's
/// open load.
pub fn doctor_statistics(store: &dyn EntityStore) -> Result<DoctorStatistics, ServiceError> {
    let doctors = store
        .group(GroupDimension::Doctor, true)?
        .into_iter()
        .map(|g| DoctorLoad {
            username: g.key,
            name: g.label,
            active_patients: g.active_count,
        })
        .collect();
    Ok(DoctorStatistics {
        total: store.count_doctors()?,
        active: store.count_doctors_with_active()?,
        doctors,
    })
}
