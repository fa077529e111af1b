//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{schema_version, ReferenceStore};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub schema_version: i64,
    pub departments: u32,
}

/// `GET /api/health`: liveness plus a round trip to the database.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let store = ctx.open_store()?;
    let departments = store.count_departments()?;
    let schema_version = schema_version(store.connection())?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        schema_version,
        departments,
    }))
}
