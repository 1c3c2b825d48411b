//! Whitelist (false positive) entries

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
use rampart_core::WhitelistEntry;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWhitelistRequest {
    #[serde(default)]
    pub wlog_id: Option<i32>,
    pub reason: String,
    #[serde(default)]
    pub user_id: Option<i32>,
}

/// GET /api/whitelist
pub async fn list_whitelist(State(db): State<DbClient>) -> ApiResult<Json<Vec<WhitelistEntry>>> {
    Ok(Json(db.whitelist_list().await?))
}

/// POST /api/whitelist - mark a journaled request as a false positive.
/// Any authenticated role.
pub async fn create_whitelist(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateWhitelistRequest>,
) -> ApiResult<(StatusCode, Json<WhitelistEntry>)> {
    if request.reason.is_empty() {
        return Err(ApiError::missing_field("reason"));
    }
    let entry = db
        .whitelist_create(request.wlog_id, &request.reason, request.user_id)
        .await?;
    tracing::info!(wl_id = entry.wl_id, by = %context.username, "request whitelisted");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /api/whitelist/{id} - admin only.
pub async fn delete_whitelist(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(wl_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.whitelist_delete(wl_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/whitelist", get(list_whitelist).post(create_whitelist))
        .route("/whitelist/:id", axum::routing::delete(delete_whitelist))
}
