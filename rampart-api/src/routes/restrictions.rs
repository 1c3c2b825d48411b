//! Restriction (block list) CRUD

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use rampart_core::{IndicatorKind, Restriction};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRestrictionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// GET /api/restrictions - full block list.
pub async fn list_restrictions(State(db): State<DbClient>) -> ApiResult<Json<Vec<Restriction>>> {
    Ok(Json(db.restriction_list().await?))
}

/// POST /api/restrictions - add a blocked indicator. Admin only.
pub async fn create_restriction(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateRestrictionRequest>,
) -> ApiResult<(StatusCode, Json<Restriction>)> {
    context.require_admin()?;
    let kind = IndicatorKind::parse(&request.kind).ok_or_else(|| {
        ApiError::invalid_input(format!(
            "Invalid type: {}. Must be 'ip', 'domain', or 'hash'",
            request.kind
        ))
    })?;
    if request.value.is_empty() {
        return Err(ApiError::missing_field("value"));
    }

    let restriction = db.restriction_create(kind, &request.value).await?;
    tracing::info!(kind = %kind, value = %request.value, by = %context.username, "restriction added");
    Ok((StatusCode::CREATED, Json(restriction)))
}

/// DELETE /api/restrictions/{id} - remove a blocked indicator. Admin only.
pub async fn delete_restriction(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(restriction_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.restriction_delete(restriction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/restrictions",
            get(list_restrictions).post(create_restriction),
        )
        .route("/restrictions/:id", delete(delete_restriction))
}
