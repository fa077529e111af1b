//! Report endpoints. Each takes optional `start_date`/`end_date`.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DateRangeQuery};
use crate::reports::{self, AdmissionsReport, DepartmentReportRow, RevenueReport};

/// `GET /api/reports/admissions`
pub async fn admissions(
    State(ctx): State<ApiContext>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<AdmissionsReport>, ApiError> {
    let range = query.to_range()?;
    let store = ctx.open_store()?;
    Ok(Json(reports::admissions_report(&store, &range)?))
}

/// `GET /api/reports/revenue`
pub async fn revenue(
    State(ctx): State<ApiContext>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<RevenueReport>, ApiError> {
    let range = query.to_range()?;
    let store = ctx.open_store()?;
    Ok(Json(reports::revenue_report(&store, &range)?))
}

/// `GET /api/reports/departments`
pub async fn departments(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<DepartmentReportRow>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(reports::department_report(&store)?))
}
