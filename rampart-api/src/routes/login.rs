//! Login endpoint

use crate::auth::{verify_password, AuthContext, TokenSet};
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{LoginRequest, LoginResponse};
use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

/// POST /api/login - verify credentials against the user store and mint a
/// session token into the process-local set.
pub async fn login(
    State(db): State<DbClient>,
    State(tokens): State<Arc<TokenSet>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if request.username.is_empty() {
        return Err(ApiError::missing_field("username"));
    }
    if request.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    let user = db
        .user_find_by_username(&request.username)
        .await?
        .filter(|user| verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let token = tokens.mint(AuthContext::new(user.username.clone(), user.role));
    tracing::info!(username = %user.username, role = %user.role, "login succeeded");

    Ok(Json(LoginResponse { token, user }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
