//! HTTP adapter.
//!
//! Exposes the lifecycle, statistics, report and registry operations as
//! JSON endpoints under `/api/`. Handlers hold no state of their own:
//! every request opens a store on the configured database file.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
