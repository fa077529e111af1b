//! Patient registry endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::ReferenceStore;
use crate::error::ServiceError;
use crate::models::{utc_now, NewPatient, Patient, PatientUpdate};
use crate::registry::{self, PatientHistory, PatientListing};

/// `GET /api/patients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<PatientListing>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::list_patients(&store)?))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(new): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let store = ctx.open_store()?;
    Ok((StatusCode::CREATED, Json(registry::add_patient(&store, &new)?)))
}

/// `GET /api/patients/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let store = ctx.open_store()?;
    let patient = store
        .patient(id)?
        .ok_or_else(|| ServiceError::not_found("patient", id))?;
    Ok(Json(patient))
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(update): Json<PatientUpdate>,
) -> Result<Json<Patient>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::update_patient(&store, id, &update)?))
}

/// `DELETE /api/patients/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = ctx.open_store()?;
    registry::delete_patient(&store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/patients/:id/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<PatientHistory>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::patient_history(&store, id, utc_now())?))
}
