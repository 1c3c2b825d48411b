//! Model metadata CRUD

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rampart_core::ModelInfo;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateModelRequest {
    pub model_type: String,
    #[serde(default)]
    pub model_description: Option<String>,
    #[serde(default = "default_threshold")]
    pub model_threshold: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateModelRequest {
    pub model_type: Option<String>,
    pub model_description: Option<String>,
    pub model_threshold: Option<f64>,
}

fn default_threshold() -> f64 {
    0.5
}

fn check_threshold(threshold: f64) -> ApiResult<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ApiError::invalid_input(
            "model_threshold must be in [0, 1]".to_string(),
        ))
    }
}

/// GET /api/models
pub async fn list_models(State(db): State<DbClient>) -> ApiResult<Json<Vec<ModelInfo>>> {
    Ok(Json(db.model_list().await?))
}

/// POST /api/models - admin only.
pub async fn create_model(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateModelRequest>,
) -> ApiResult<(StatusCode, Json<ModelInfo>)> {
    context.require_admin()?;
    check_threshold(request.model_threshold)?;
    let model = db
        .model_create(
            &request.model_type,
            request.model_description.as_deref(),
            request.model_threshold,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(model)))
}

/// PUT /api/models/{id} - admin only.
pub async fn update_model(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(model_id): Path<i32>,
    Json(request): Json<UpdateModelRequest>,
) -> ApiResult<Json<ModelInfo>> {
    context.require_admin()?;
    if let Some(threshold) = request.model_threshold {
        check_threshold(threshold)?;
    }
    let model = db
        .model_update(
            model_id,
            request.model_type.as_deref(),
            request.model_description.as_deref(),
            request.model_threshold,
        )
        .await?;
    Ok(Json(model))
}

/// DELETE /api/models/{id} - admin only.
pub async fn delete_model(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(model_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.model_delete(model_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/models", get(list_models).post(create_model))
        .route(
            "/models/:id",
            axum::routing::put(update_model).delete(delete_model),
        )
}
