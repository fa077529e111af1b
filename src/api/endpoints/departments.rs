//! Department and admission type endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{utc_now, AdmissionType, Department};
use crate::registry;
use crate::statistics::DepartmentOccupancy;

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// `GET /api/departments`: with active/total admissions, occupancy and
/// this month's revenue.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<DepartmentOccupancy>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::list_departments(&store, &ctx.capacity, utc_now())?))
}

/// `POST /api/departments`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<Department>), ApiError> {
    let store = ctx.open_store()?;
    Ok((StatusCode::CREATED, Json(registry::add_department(&store, &body.name)?)))
}

/// `PUT /api/departments/:id`
pub async fn rename(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(body): Json<NameRequest>,
) -> Result<Json<Department>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::rename_department(&store, id, &body.name)?))
}

/// `DELETE /api/departments/:id`
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let store = ctx.open_store()?;
    registry::delete_department(&store, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admission-types`
pub async fn admission_types(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<AdmissionType>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(registry::list_admission_types(&store)?))
}

/// `POST /api/admission-types`
pub async fn create_admission_type(
    State(ctx): State<ApiContext>,
    Json(body): Json<NameRequest>,
) -> Result<(StatusCode, Json<AdmissionType>), ApiError> {
    let store = ctx.open_store()?;
    Ok((StatusCode::CREATED, Json(registry::add_admission_type(&store, &body.name)?)))
}
