//! Doctor registry endpoints, keyed by username.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::ReferenceStore;
use crate::error::ServiceError;
use crate::models::{utc_now, Doctor, DoctorUpdate, NewDoctor};
use crate::registry::{self, DoctorHistory, DoctorListing};

/// `GET /api/doctors`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<DoctorListing>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::list_doctors(&store)?))
}

/// `POST /api/doctors`: the password is hashed, never echoed back.
///
/// Hashing runs PBKDF2 on a blocking thread.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewDoctor>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let doctor = tokio::task::spawn_blocking(move || -> Result<Doctor, ApiError> {
        let store = ctx.open_store()?;
        Ok(registry::add_doctor(&store, &new)?)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Doctor registration task failed: {e}")))??;

    Ok((StatusCode::CREATED, Json(doctor)))
}

/// `GET /api/doctors/:username`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(username): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let store = ctx.open_store()?;
    let doctor = store
        .doctor(&username)?
        .ok_or_else(|| ServiceError::not_found("doctor", &username))?;
    Ok(Json(doctor))
}

/// `PUT /api/doctors/:username`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(username): Path<String>,
    Json(update): Json<DoctorUpdate>,
) -> Result<Json<Doctor>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::update_doctor(&store, &username, &update)?))
}

/// `DELETE /api/doctors/:username`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    let store = ctx.open_store()?;
    registry::delete_doctor(&store, &username)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/doctors/:username/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(username): Path<String>,
) -> Result<Json<DoctorHistory>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::doctor_history(&store, &username, utc_now())?))
}
