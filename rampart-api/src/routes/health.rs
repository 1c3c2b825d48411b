//! Health endpoint

use crate::db::DbClient;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

/// GET /api/health - liveness plus database reachability.
pub async fn health(State(db): State<DbClient>) -> Json<Value> {
    let database = db.ping().await;
    Json(json!({
        "status": "ok",
        "database": database,
    }))
}

/// GET /health - bare liveness for the inline listener itself; never
/// inspected by the pipeline.
pub async fn liveness() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Fallback for unknown /api paths, keeping them out of the pipeline.
pub async fn api_not_found() -> crate::error::ApiError {
    crate::error::ApiError::not_found("Unknown API route")
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
