use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET /health - liveness probe.
pub async fn health() -> axum::response::Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
