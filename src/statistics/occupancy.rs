use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::config::CapacityConfig;
use crate::db::{EntityStore, ReferenceStore, StatisticsStore};
use crate::error::ServiceError;
use crate::format::round1;
use crate::models::GroupDimension;

use super::types::{BedStatistics, CapacityAlert, DepartmentOccupancy, Occupancy};
use super::revenue::month_revenue_by_department;

/// Open admissions in one department, or hospital-wide when `None`.
pub fn occupancy(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
    department_id: Option<i64>,
) -> Result<Occupancy, ServiceError> {
    let beds = match department_id {
        Some(id) => {
            if store.department(id)?.is_none() {
                return Err(ServiceError::not_found("department", id));
            }
            capacity.beds_per_department
        }
        None => capacity.hospital_beds,
    };
    let active = store.count_active(department_id)?;
    Ok(Occupancy {
        active,
        capacity: beds,
        ratio: occupancy_ratio(active, beds),
    })
}

/// `active / capacity` as a percentage, one decimal. Zero capacity reads as 0.
pub fn occupancy_ratio(active: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    round1(f64::from(active) / f64::from(capacity) * 100.0)
}

pub fn bed_statistics(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
) -> Result<BedStatistics, ServiceError> {
    let occupied = store.count_active(None)?;
    Ok(BedStatistics {
        total: capacity.hospital_beds,
        occupied,
        available: capacity.hospital_beds.saturating_sub(occupied),
    })
}

/// One row per department, empty departments included.
pub fn department_occupancy(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
    now: NaiveDateTime,
) -> Result<Vec<DepartmentOccupancy>, ServiceError> {
    let departments = store.departments()?;
    let revenue = month_revenue_by_department(store, &departments, now)?;
    let totals: HashMap<String, u32> = store
        .group(GroupDimension::Department, true)?
        .into_iter()
        .map(|g| (g.key, g.count))
        .collect();
    let mut rows = Vec::with_capacity(departments.len());
    for (department, revenue) in departments.into_iter().zip(revenue) {
        let active = store.count_active(Some(department.id))?;
        let total = totals.get(&department.name).copied().unwrap_or(0);
        rows.push(DepartmentOccupancy {
            id: department.id,
            name: department.name,
            active_patients: active,
            total_admissions: total,
            occupancy: occupancy_ratio(active, capacity.beds_per_department),
            revenue,
        });
    }
    Ok(rows)
}

/// Warnings for the hospital and for each department whose occupancy
/// exceeds the alert threshold.
pub fn capacity_alerts(
    store: &dyn EntityStore,
    capacity: &CapacityConfig,
) -> Result<Vec<CapacityAlert>, ServiceError> {
    let threshold_pct = round1(capacity.alert_threshold * 100.0);
    let mut alerts = Vec::new();

    let occupied = store.count_active(None)?;
    if over_threshold(occupied, capacity.hospital_beds, capacity.alert_threshold) {
        alerts.push(CapacityAlert {
            kind: "warning",
            message: format!("Hospital bed capacity is above {threshold_pct}%"),
            details: format!("{occupied} out of {} beds occupied", capacity.hospital_beds),
        });
    }

    for department in store.departments()? {
        let active = store.count_active(Some(department.id))?;
        if over_threshold(active, capacity.beds_per_department, capacity.alert_threshold) {
            alerts.push(CapacityAlert {
                kind: "warning",
                message: format!("{} department is near capacity", department.name),
                details: format!("{active} out of {} beds occupied", capacity.beds_per_department),
            });
        }
    }

    if !alerts.is_empty() {
        tracing::warn!(count = alerts.len(), "Capacity alerts raised");
    }
    Ok(alerts)
}

fn over_threshold(active: u32, beds: u32, threshold: f64) -> bool {
    beds > 0 && f64::from(active) / f64::from(beds) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, at, seeded_store};
    use crate::db::SqliteStore;

    /// Admit `n` throwaway patients into one department.
    fn fill(store: &SqliteStore, department_id: i64, admission_type: i64, n: usize) {
        let conn = store.connection();
        for i in 0..n {
            conn.execute(
                "INSERT INTO patients (name) VALUES (?1)",
                rusqlite::params![format!("Filler {i}")],
            )
            .unwrap();
            let patient = conn.last_insert_rowid();
            fixtures::admit(conn, patient, department_id, "dr.smith", admission_type, at(2026, 3, 1, 9), None, 0.0);
        }
    }

    #[test]
    fn ratio_is_percentage_with_one_decimal() {
        assert_eq!(occupancy_ratio(45, 50), 90.0);
        assert_eq!(occupancy_ratio(1, 3), 33.3);
        assert_eq!(occupancy_ratio(0, 50), 0.0);
        assert_eq!(occupancy_ratio(5, 0), 0.0);
    }

    #[test]
    fn department_and_hospital_scopes() {
        let (store, seed) = seeded_store();
        let cap = CapacityConfig::default();
        fill(&store, seed.cardiology, seed.emergency, 45);

        let cardio = occupancy(&store, &cap, Some(seed.cardiology)).unwrap();
        assert_eq!((cardio.active, cardio.capacity, cardio.ratio), (45, 50, 90.0));

        let hospital = occupancy(&store, &cap, None).unwrap();
        assert_eq!((hospital.active, hospital.capacity, hospital.ratio), (45, 200, 22.5));

        let err = occupancy(&store, &cap, Some(999)).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[test]
    fn beds_never_go_negative() {
        let (store, seed) = seeded_store();
        let cap = CapacityConfig { hospital_beds: 2, ..Default::default() };
        fill(&store, seed.orthopedics, seed.planned, 3);
        let beds = bed_statistics(&store, &cap).unwrap();
        assert_eq!((beds.total, beds.occupied, beds.available), (2, 3, 0));
    }

    #[test]
    fn alerts_fire_strictly_above_threshold() {
        let (store, seed) = seeded_store();
        let cap = CapacityConfig::default();

        fill(&store, seed.cardiology, seed.emergency, 45);
        assert!(capacity_alerts(&store, &cap).unwrap().is_empty(), "exactly 90% is not above");

        fill(&store, seed.cardiology, seed.emergency, 1);
        let alerts = capacity_alerts(&store, &cap).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Cardiology department is near capacity");
        assert_eq!(alerts[0].details, "46 out of 50 beds occupied");
    }

    #[test]
    fn hospital_alert() {
        let (store, seed) = seeded_store();
        let cap = CapacityConfig { hospital_beds: 10, beds_per_department: 100, alert_threshold: 0.9 };
        fill(&store, seed.orthopedics, seed.planned, 10);
        let alerts = capacity_alerts(&store, &cap).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "Hospital bed capacity is above 90%");
    }

    #[test]
    fn department_rows_include_empty_departments() {
        let (store, seed) = seeded_store();
        let conn = store.connection();
        fixtures::admit(conn, seed.patient_a, seed.cardiology, "dr.smith", seed.emergency, fixtures::days_ago(0), None, 300.0);
        fixtures::admit(conn, seed.patient_b, seed.cardiology, "dr.smith", seed.emergency, at(2020, 1, 1, 9), Some(at(2020, 1, 2, 9)), 50.0);

        let rows = department_occupancy(&store, &CapacityConfig::default(), fixtures::now()).unwrap();
        assert_eq!(rows.len(), 3);
        let cardio = rows.iter().find(|r| r.name == "Cardiology").unwrap();
        assert_eq!((cardio.active_patients, cardio.total_admissions), (1, 2));
        assert_eq!(cardio.occupancy, 2.0);
        assert_eq!(cardio.revenue, 300.0);

        let peds = rows.iter().find(|r| r.name == "Pediatrics").unwrap();
        assert_eq!((peds.active_patients, peds.total_admissions, peds.revenue), (0, 0, 0.0));
    }
}
