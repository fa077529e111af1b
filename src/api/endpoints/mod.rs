//! API endpoint handlers. Each handler opens a request-scoped store and
//! delegates to the domain modules.

pub mod admissions;
pub mod dashboard;
pub mod departments;
pub mod doctors;
pub mod health;
pub mod patients;
pub mod reports;
pub mod statistics;
