/*
 * Responsibility
 * - GET /health (疎通用)
 * - identity middleware の外側に置く (trusted header なしで応答する)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
