use std::collections::BTreeMap;

use crate::db::{EntityStore, StatisticsStore};
use crate::error::ServiceError;
use crate::format::round2;
use crate::models::GroupDimension;

use super::types::GroupStats;

/// Admission count, open count and revenue keyed by the dimension's natural
/// key (department name, doctor username, admission type name).
///
/// `include_empty` enumerates the whole reference table so groups without
/// admissions appear with zeros; otherwise only groups that have
/// admissions are returned.
pub fn group_by(
    store: &dyn EntityStore,
    dimension: GroupDimension,
    include_empty: bool,
) -> Result<BTreeMap<String, GroupStats>, ServiceError> {
    Ok(store
        .group(dimension, include_empty)?
        .into_iter()
        .map(|row| {
            (
                row.key,
                GroupStats {
                    label: row.label,
                    count: row.count,
                    active_count: row.active_count,
                    revenue: round2(row.revenue),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, at, seeded_store};

    #[test]
    fn empty_groups_only_on_request() {
        let (store, seed) = seeded_store();
        let conn = store.connection();
        fixtures::admit(conn, seed.patient_a, seed.cardiology, "dr.smith", seed.emergency, at(2026, 3, 1, 9), None, 100.0);
        fixtures::admit(conn, seed.patient_b, seed.orthopedics, "dr.smith", seed.emergency, at(2026, 3, 2, 9), Some(at(2026, 3, 3, 9)), 50.25);

        let inclusive = group_by(&store, GroupDimension::Department, true).unwrap();
        assert_eq!(inclusive.len(), 3);
        assert_eq!(inclusive["Pediatrics"].count, 0);

        let exclusive = group_by(&store, GroupDimension::Department, false).unwrap();
        assert_eq!(exclusive.keys().cloned().collect::<Vec<_>>(), vec!["Cardiology", "Orthopedics"]);
        assert_eq!(exclusive["Orthopedics"].active_count, 0);
        assert_eq!(exclusive["Orthopedics"].revenue, 50.25);
    }

    #[test]
    fn doctor_groups_carry_display_names() {
        let (store, seed) = seeded_store();
        fixtures::admit(store.connection(), seed.patient_a, seed.cardiology, "dr.jones", seed.planned, at(2026, 3, 1, 9), None, 10.0);

        let doctors = group_by(&store, GroupDimension::Doctor, true).unwrap();
        assert_eq!(doctors["dr.jones"].label, "Dr. Sarah Jones");
        assert_eq!(doctors["dr.jones"].active_count, 1);
        assert_eq!(doctors["dr.smith"].count, 0);

        let types = group_by(&store, GroupDimension::AdmissionType, false).unwrap();
        assert_eq!(types.len(), 1);
        assert!(types.contains_key("Planned Surgery"));
    }
}
