//! Liveness and upstream service health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::http::AppState;

/// `GET /health` — the gateway process is up.
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `GET /v1/service-health` — 200 when every checker passes, else 503.
pub async fn service_health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.health.check_all().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
