//! HTTP router.
//!
//! All routes live under `/api/`. Layers, outermost first: CORS,
//! `Cache-Control: no-store`, access log, handler.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router over `ctx`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        // Dashboard & statistics
        .route("/dashboard/stats", get(endpoints::dashboard::stats))
        .route("/dashboard/overview", get(endpoints::dashboard::overview))
        .route("/dashboard/alerts", get(endpoints::dashboard::alerts))
        .route("/statistics/patients", get(endpoints::statistics::patients))
        .route("/statistics/admissions", get(endpoints::statistics::admissions))
        .route("/statistics/doctors", get(endpoints::statistics::doctors))
        .route("/statistics/departments", get(endpoints::statistics::departments))
        .route("/statistics/beds", get(endpoints::statistics::beds))
        .route("/statistics/revenue", get(endpoints::statistics::revenue))
        .route("/statistics/occupancy", get(endpoints::statistics::occupancy))
        // Admissions
        .route(
            "/admissions",
            get(endpoints::admissions::list).post(endpoints::admissions::create),
        )
        .route("/admissions/:id", get(endpoints::admissions::view))
        .route(
            "/admissions/:id/discharge",
            post(endpoints::admissions::discharge),
        )
        .route(
            "/admissions/:id/details",
            get(endpoints::admissions::details).post(endpoints::admissions::add_detail),
        )
        .route(
            "/admissions/:id/medical-details",
            get(endpoints::admissions::medical_detail)
                .put(endpoints::admissions::save_medical_detail),
        )
        .route("/recent-admissions", get(endpoints::admissions::recent))
        // Reports
        .route("/reports/admissions", get(endpoints::reports::admissions))
        .route("/reports/revenue", get(endpoints::reports::revenue))
        .route("/reports/departments", get(endpoints::reports::departments))
        // Registry
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::get)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::delete),
        )
        .route("/patients/:id/history", get(endpoints::patients::history))
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/doctors/:username",
            get(endpoints::doctors::get)
                .put(endpoints::doctors::update)
                .delete(endpoints::doctors::delete),
        )
        .route("/doctors/:username/history", get(endpoints::doctors::history))
        .route(
            "/departments",
            get(endpoints::departments::list).post(endpoints::departments::create),
        )
        .route(
            "/departments/:id",
            axum::routing::put(endpoints::departments::rename)
                .delete(endpoints::departments::delete),
        )
        .route(
            "/admission-types",
            get(endpoints::departments::admission_types)
                .post(endpoints::departments::create_admission_type),
        )
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::config::CapacityConfig;
    use crate::db::fixtures::{self, Seed};
    use crate::db::open_database;

    /// Router over a seeded file-backed database.
    /// The tempdir guard must be kept alive for the duration of the test.
    fn test_router() -> (Router, Seed, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("wardline.db");
        let conn = open_database(&path).unwrap();
        let seed = fixtures::seed(&conn);
        drop(conn);
        let ctx = ApiContext::new(path, CapacityConfig::default());
        (api_router(ctx), seed, tmp)
    }

    fn request(method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(
        router: &Router,
        req: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn admission_body(seed: &Seed, patient_id: i64) -> serde_json::Value {
        serde_json::json!({
            "patient_id": patient_id,
            "department_id": seed.cardiology,
            "doctor_username": "dr.smith",
            "admission_type_id": seed.emergency,
            "condition": "Chest pain",
            "fee": 250.0,
        })
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (router, _seed, _tmp) = test_router();
        let response = router
            .clone()
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "no-store"
        );

        let (_, body) = send(&router, request("GET", "/api/health", None)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["departments"], 3);
        assert_eq!(body["schema_version"], 3);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (router, _seed, _tmp) = test_router();
        let response = router
            .oneshot(request("GET", "/api/nonexistent", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admit_then_discharge_over_http() {
        let (router, seed, _tmp) = test_router();

        let (status, created) = send(
            &router,
            request("POST", "/api/admissions", Some(admission_body(&seed, seed.patient_a))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Active");
        assert_eq!(created["patient_name"], "James Wilson");
        assert_eq!(created["length_of_stay"], 0);
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &router,
            request("POST", "/api/admissions", Some(admission_body(&seed, seed.patient_a))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");

        let uri = format!("/api/admissions/{id}/discharge");
        let (status, discharged) = send(&router, request("POST", &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(discharged["status"], "Discharged");
        assert!(discharged["discharge_date"].is_string());

        let (status, _) = send(&router, request("POST", &uri, None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn admission_with_unknown_reference_is_404() {
        let (router, seed, _tmp) = test_router();
        let mut body = admission_body(&seed, seed.patient_b);
        body["doctor_username"] = "dr.nobody".into();
        let (status, body) = send(&router, request("POST", "/api/admissions", Some(body))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&router, request("GET", "/api/admissions/999", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn negative_fee_is_bad_request() {
        let (router, seed, _tmp) = test_router();
        let mut body = admission_body(&seed, seed.patient_c);
        body["fee"] = (-5.0).into();
        let (status, body) = send(&router, request("POST", "/api/admissions", Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn medical_details_roundtrip() {
        let (router, seed, _tmp) = test_router();
        let (_, created) = send(
            &router,
            request("POST", "/api/admissions", Some(admission_body(&seed, seed.patient_b))),
        )
        .await;
        let uri = format!("/api/admissions/{}/medical-details", created["id"]);

        let (status, empty) = send(&router, request("GET", &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty["diagnosis"], "");

        let (status, _) = send(
            &router,
            request("PUT", &uri, Some(serde_json::json!({ "diagnosis": "Angina" }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, saved) = send(
            &router,
            request(
                "PUT",
                &uri,
                Some(serde_json::json!({
                    "diagnosis": "Angina",
                    "symptoms": "Chest pain",
                    "treatment": "Nitrates",
                    "next_checkup": "2026-11-02 09:00:00",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["next_checkup"], "2026-11-02 09:00:00");
    }

    #[tokio::test]
    async fn report_date_validation() {
        let (router, _seed, _tmp) = test_router();
        let (status, _) = send(
            &router,
            request("GET", "/api/reports/admissions?start_date=2026-02-01&end_date=2026-01-01", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            request("GET", "/api/reports/revenue?start_date=yesterday", None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("start_date"));
    }

    #[tokio::test]
    async fn out_of_range_end_dates_are_rejected() {
        let (router, _seed, _tmp) = test_router();
        for uri in [
            "/api/reports/revenue?end_date=%2B262142-12-31",
            "/api/reports/admissions?end_date=%2B262142-12-31",
            "/api/admissions?end_date=%2B10000-01-01",
            "/api/admissions?date=%2B262142-12-31",
        ] {
            let (status, body) = send(&router, request("GET", uri, None)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "BAD_REQUEST");
        }

        let (status, _) = send(
            &router,
            request("GET", "/api/reports/revenue?end_date=9999-12-31", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn department_report_includes_empty_departments() {
        let (router, _seed, _tmp) = test_router();
        let (status, body) = send(&router, request("GET", "/api/reports/departments", None)).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows
            .iter()
            .any(|r| r["department"] == "Pediatrics" && r["total_admissions"] == 0));
    }

    #[tokio::test]
    async fn invalid_status_filter_is_bad_request() {
        let (router, _seed, _tmp) = test_router();
        let (status, _) = send(&router, request("GET", "/api/admissions?status=pending", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&router, request("GET", "/api/admissions?status=active", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn doctor_creation_never_echoes_password() {
        let (router, _seed, tmp) = test_router();
        let (status, body) = send(
            &router,
            request(
                "POST",
                "/api/doctors",
                Some(serde_json::json!({
                    "username": "dr.lee",
                    "name": "Dr. Amy Lee",
                    "password": "s3cret-pass",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "dr.lee");
        assert!(body.get("password").is_none());

        let store = crate::db::SqliteStore::open(&tmp.path().join("wardline.db")).unwrap();
        assert!(crate::credentials::verify_credentials(&store, "dr.lee", "s3cret-pass").unwrap());
        assert!(!crate::credentials::verify_credentials(&store, "dr.lee", "wrong").unwrap());
        drop(store);

        let (status, _) = send(&router, request("DELETE", "/api/doctors/dr.lee", None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn department_with_active_patient_cannot_be_deleted() {
        let (router, seed, _tmp) = test_router();
        send(
            &router,
            request("POST", "/api/admissions", Some(admission_body(&seed, seed.patient_a))),
        )
        .await;
        let uri = format!("/api/departments/{}", seed.cardiology);
        let (status, body) = send(&router, request("DELETE", &uri, None)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"]["message"],
            "cannot delete department with active patients"
        );
    }

    #[tokio::test]
    async fn dashboard_overview_counts_seed() {
        let (router, _seed, _tmp) = test_router();
        let (status, body) = send(&router, request("GET", "/api/dashboard/overview", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patients"]["total"], 3);
        assert_eq!(body["beds"]["available"], 200);
    }
}
