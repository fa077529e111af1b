//! Dashboard endpoints.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::utc_now;
use crate::statistics::{self, CapacityAlert, DashboardOverview, DashboardStats};

/// `GET /api/dashboard/stats`: month revenue, seven-day admission trend,
/// department occupancy.
pub async fn stats(State(ctx): State<ApiContext>) -> Result<Json<DashboardStats>, ApiError> {
    let store = ctx.open_store()?;
    let stats = statistics::dashboard_stats(&store, &ctx.capacity, utc_now())?;
    Ok(Json(stats))
}

/// `GET /api/dashboard/overview`
pub async fn overview(State(ctx): State<ApiContext>) -> Result<Json<DashboardOverview>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::dashboard_overview(&store, &ctx.capacity)?))
}

/// `GET /api/dashboard/alerts`
pub async fn alerts(State(ctx): State<ApiContext>) -> Result<Json<Vec<CapacityAlert>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(statistics::capacity_alerts(&store, &ctx.capacity)?))
}
