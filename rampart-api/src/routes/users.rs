//! User management. All mutations are admin-scoped; duplicate usernames
//! or emails surface as 409.

use crate::auth::{hash_password, AuthExtractor};
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rampart_core::{Role, User};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

fn parse_role(value: &str) -> ApiResult<Role> {
    Role::parse(value).ok_or_else(|| {
        ApiError::invalid_input(format!(
            "Invalid role: {}. Must be 'admin', 'user', or 'analyst'",
            value
        ))
    })
}

/// GET /api/users - admin only; password hashes never serialize.
pub async fn list_users(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
) -> ApiResult<Json<Vec<User>>> {
    context.require_admin()?;
    Ok(Json(db.user_list().await?))
}

/// POST /api/users - admin only.
pub async fn create_user(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    context.require_admin()?;
    if request.username.chars().count() < 3 {
        return Err(ApiError::invalid_input("username must be at least 3 characters"));
    }
    if !request.email.contains('@') || !request.email.contains('.') {
        return Err(ApiError::invalid_input("invalid email format"));
    }
    if request.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }
    let role = match &request.role {
        Some(value) => parse_role(value)?,
        None => Role::User,
    };

    let password_hash = hash_password(&request.password)?;
    let user = db
        .user_create(&request.username, &password_hash, &request.email, role)
        .await?;
    tracing::info!(username = %user.username, by = %context.username, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id} - admin only.
pub async fn update_user(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(user_id): Path<i32>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    context.require_admin()?;
    let role = match &request.role {
        Some(value) => Some(parse_role(value)?),
        None => None,
    };
    let password_hash = match &request.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = db
        .user_update(
            user_id,
            request.email.as_deref(),
            role,
            password_hash.as_deref(),
        )
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id} - admin only.
pub async fn delete_user(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(user_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.user_delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            axum::routing::put(update_user).delete(delete_user),
        )
}
