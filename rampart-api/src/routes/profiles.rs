//! Suspicious-user profile CRUD

use crate::auth::AuthExtractor;
use crate::db::{DbClient, ProfileParams};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rampart_core::SuspiciousUserProfile;
use serde::Deserialize;

const SUSPICION_LEVELS: [&str; 4] = ["Low", "Medium", "High", "Critical"];

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    pub sus_username: String,
    #[serde(default)]
    pub pc_number: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default)]
    pub suspicion_level: Option<String>,
}

impl ProfileRequest {
    pub(crate) fn into_params(self) -> ApiResult<ProfileParams> {
        if self.sus_username.is_empty() {
            return Err(ApiError::missing_field("sus_username"));
        }
        let suspicion_level = self.suspicion_level.unwrap_or_else(|| "Low".to_string());
        if !SUSPICION_LEVELS.contains(&suspicion_level.as_str()) {
            return Err(ApiError::invalid_input(format!(
                "Invalid suspicion_level: {}",
                suspicion_level
            )));
        }
        Ok(ProfileParams {
            sus_username: self.sus_username,
            pc_number: self.pc_number,
            ip_address: self.ip_address,
            mac_address: self.mac_address,
            session_cookie: self.session_cookie,
            suspicion_level,
        })
    }
}

/// GET /api/profiles
pub async fn list_profiles(
    State(db): State<DbClient>,
) -> ApiResult<Json<Vec<SuspiciousUserProfile>>> {
    Ok(Json(db.profile_list().await?))
}

/// POST /api/profiles - admin only.
pub async fn create_profile(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<(StatusCode, Json<SuspiciousUserProfile>)> {
    context.require_admin()?;
    let profile = db.profile_create(&request.into_params()?).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PUT /api/profiles/{id} - admin only.
pub async fn update_profile(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(sus_user_id): Path<i32>,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<Json<SuspiciousUserProfile>> {
    context.require_admin()?;
    let profile = db
        .profile_update(sus_user_id, &request.into_params()?)
        .await?;
    Ok(Json(profile))
}

/// DELETE /api/profiles/{id} - admin only.
pub async fn delete_profile(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(sus_user_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.profile_delete(sus_user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles).post(create_profile))
        .route(
            "/profiles/:id",
            axum::routing::put(update_profile).delete(delete_profile),
        )
}
