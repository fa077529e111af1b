use serde::{Deserialize, Serialize};

/// A doctor; `username` doubles as the credential login id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub username: String,
    pub name: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}
