//! Training state stub routes

use crate::auth::AuthExtractor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::training::{TrainingState, TrainingStatus};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// GET /api/training/status
pub async fn training_status(State(training): State<Arc<TrainingState>>) -> Json<TrainingStatus> {
    Json(training.status())
}

/// POST /api/training/start - admin only; 409 while a run is in progress.
/// Actual training happens in the external ML stack; this toggles the
/// reported state.
pub async fn start_training(
    State(training): State<Arc<TrainingState>>,
    AuthExtractor(context): AuthExtractor,
) -> ApiResult<Json<TrainingStatus>> {
    context.require_admin()?;
    if !training.start() {
        return Err(ApiError::conflict("Training already in progress"));
    }
    tracing::info!(by = %context.username, "training marked started");
    Ok(Json(training.status()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/training/status", get(training_status))
        .route("/training/start", post(start_training))
}
