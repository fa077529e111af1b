//! Statistics aggregator: occupancy, revenue, trends, daily series and
//! grouped totals over admissions, plus the dashboard figures built from
//! them.
//!
//! Every function is a pure read through `&dyn EntityStore`; clock
//! readings are passed in so results are reproducible.

mod dashboard;
mod groups;
mod occupancy;
mod revenue;
mod trends;
mod types;

pub use dashboard::*;
pub use groups::*;
pub use occupancy::*;
pub use revenue::revenue;
pub use trends::*;
pub use types::*;
