use axum::Json;
use serde_json::{json, Value};

/// GET /ping
pub async fn ping_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /
pub async fn home_handler() -> Json<Value> {
    Json(json!({ "message": "Resume Screener Backend is running!" }))
}
