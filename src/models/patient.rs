use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub condition: Option<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub condition: Option<String>,
}
