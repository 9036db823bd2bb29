pub mod cron;
pub mod guest;
pub mod orders;

use super::error::{ApiError, ErrorCode};
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({"success": true, "status": "ok"}))
}

pub async fn not_found() -> ApiError {
    ApiError::bare(ErrorCode::RouteNotFound)
}
