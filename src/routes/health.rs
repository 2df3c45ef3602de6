use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::server::AppState;

/// Liveness check.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status": "pong"}`
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Readiness check: checks that the store answers.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
///
/// # HTTP Status Codes
/// - **200 OK**: `{"status": "ok"}`
/// - **503 Service Unavailable**: `{"status": "unavailable"}`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
