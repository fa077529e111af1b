//! Admission endpoints: admit, discharge, vitals and medical details.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_day, ApiContext};
use crate::lifecycle::{self, AdmissionView, MedicalDetailView};
use crate::models::{
    utc_now, AdmissionDetail, AdmissionFilter, AdmissionRequest, DateRange, MedicalDetail,
    MedicalDetailInput, RecentWindow, StatusFilter, VitalsEntry,
};
use crate::reports::{self, RecentAdmission};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub department_id: Option<i64>,
    pub doctor: Option<String>,
    pub patient_id: Option<i64>,
    /// Single admission day; overrides `start_date`/`end_date`.
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

impl ListQuery {
    fn to_filter(&self) -> Result<AdmissionFilter, ApiError> {
        let range = match parse_day("date", self.date.as_deref())? {
            Some(day) => DateRange::new(Some(day), Some(day)),
            None => DateRange::new(
                parse_day("start_date", self.start_date.as_deref())?,
                parse_day("end_date", self.end_date.as_deref())?,
            ),
        };
        Ok(AdmissionFilter {
            status: parse_choice::<StatusFilter>("status", self.status.as_deref())?,
            department_id: self.department_id,
            doctor_username: self.doctor.clone().filter(|d| !d.is_empty()),
            patient_id: self.patient_id,
            range,
            limit: self.limit,
            ..Default::default()
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub filter: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DischargeRequest {
    pub fee: Option<f64>,
}

/// `GET /api/admissions`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AdmissionView>>, ApiError> {
    let filter = query.to_filter()?;
    let store = ctx.open_store()?;
    Ok(Json(lifecycle::list_admissions(&store, &filter, utc_now())?))
}

/// `POST /api/admissions`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(request): Json<AdmissionRequest>,
) -> Result<(StatusCode, Json<AdmissionView>), ApiError> {
    let store = ctx.open_store()?;
    let now = utc_now();
    let admission = lifecycle::create_admission_at(&store, &request, now)?;
    let view = lifecycle::admission_view(&store, admission.id, now)?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// `GET /api/admissions/:id`
pub async fn view(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<AdmissionView>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(lifecycle::admission_view(&store, id, utc_now())?))
}

/// `POST /api/admissions/:id/discharge`: body `{"fee": ...}` is optional.
pub async fn discharge(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    body: Option<Json<DischargeRequest>>,
) -> Result<Json<AdmissionView>, ApiError> {
    let fee = body.and_then(|Json(b)| b.fee);
    let store = ctx.open_store()?;
    let now = utc_now();
    lifecycle::discharge_admission_at(&store, id, fee, now)?;
    Ok(Json(lifecycle::admission_view(&store, id, now)?))
}

/// `GET /api/admissions/:id/details`
pub async fn details(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AdmissionDetail>>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(lifecycle::list_details(&store, id)?))
}

/// `POST /api/admissions/:id/details`
pub async fn add_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(vitals): Json<VitalsEntry>,
) -> Result<(StatusCode, Json<AdmissionDetail>), ApiError> {
    let store = ctx.open_store()?;
    let detail = lifecycle::attach_detail(&store, id, &vitals)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/admissions/:id/medical-details`
pub async fn medical_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<MedicalDetailView>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(lifecycle::medical_detail(&store, id)?))
}

/// `PUT /api/admissions/:id/medical-details`
pub async fn save_medical_detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(input): Json<MedicalDetailInput>,
) -> Result<Json<MedicalDetail>, ApiError> {
    let store = ctx.open_store()?;
    Ok(Json(lifecycle::upsert_medical_detail(&store, id, &input)?))
}

/// `GET /api/recent-admissions?filter=all|today|week&limit=`
pub async fn recent(
    State(ctx): State<ApiContext>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<RecentAdmission>>, ApiError> {
    let window = parse_choice::<RecentWindow>("filter", query.filter.as_deref())?.unwrap_or_default();
    let store = ctx.open_store()?;
    Ok(Json(reports::recent_admissions(
        &store,
        window,
        utc_now().date(),
        query.limit,
    )?))
}

fn parse_choice<T: FromStr>(field: &str, raw: Option<&str>) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => T::from_str(s)
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("unsupported {field} '{s}'"))),
    }
}
