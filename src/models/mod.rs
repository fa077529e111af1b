use chrono::{NaiveDateTime, Timelike, Utc};

pub mod admission;
pub mod admission_type;
pub mod department;
pub mod detail;
pub mod doctor;
pub mod enums;
pub mod filters;
pub mod patient;
pub mod stats;

pub use admission::*;
pub use admission_type::*;
pub use department::*;
pub use detail::*;
pub use doctor::*;
pub use enums::*;
pub use filters::*;
pub use patient::*;
pub use stats::*;

/// Storage and wire format for timestamps (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage and wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time truncated to whole seconds, as stored.
pub fn utc_now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}
