//! Statistics endpoints, one per dashboard card.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::utc_now;
use crate::statistics::{
    self, AdmissionStatistics, BedStatistics, DepartmentOccupancy, DoctorStatistics, Occupancy,
    PatientStatistics, RevenueStatistics,
};

#[derive(Debug, Default, Deserialize)]
pub struct OccupancyQuery {
    pub department_id: Option<i64>,
}

/// `GET /api/statistics/patients`
pub async fn patients(State(ctx): State<ApiContext>) -> Result<Json<PatientStatistics>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::patient_statistics(&store, utc_now())?))
}

/// `GET /api/statistics/admissions`
pub async fn admissions(
    State(ctx): State<ApiContext>,
) -> Result<Json<AdmissionStatistics>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::admission_statistics(&store, utc_now().date())?))
}

/// `GET /api/statistics/doctors`
pub async fn doctors(State(ctx): State<ApiContext>) -> Result<Json<DoctorStatistics>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::doctor_statistics(&store)?))
}

/// `GET /api/statistics/departments`
pub async fn departments(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<DepartmentOccupancy>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::department_occupancy(&store, &ctx.capacity, utc_now())?))
}

/// `GET /api/statistics/beds`
pub async fn beds(State(ctx): State<ApiContext>) -> Result<Json<BedStatistics>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::bed_statistics(&store, &ctx.capacity)?))
}

/// `GET /api/statistics/revenue`
pub async fn revenue(State(ctx): State<ApiContext>) -> Result<Json<RevenueStatistics>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::revenue_statistics(&store, utc_now())?))
}

/// `GET /api/statistics/occupancy?department_id=`: hospital-wide when
/// no department is given.
pub async fn occupancy(
    State(ctx): State<ApiContext>,
    Query(query): Query<OccupancyQuery>,
) -> Result<Json<Occupancy>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::occupancy(&store, &ctx.capacity, query.department_id)?))
}
