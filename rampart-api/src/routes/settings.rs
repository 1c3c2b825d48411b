//! Live WAF settings

use crate::auth::AuthExtractor;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{SettingsUpdate, SettingsView};
use axum::{extract::State, routing::get, Json, Router};
use rampart_proxy::ProxyState;
use std::sync::Arc;

/// GET /api/settings - current thresholds and service URLs.
pub async fn get_settings(State(proxy): State<Arc<ProxyState>>) -> Json<SettingsView> {
    Json(proxy.settings().into())
}

/// PUT /api/settings - partial update. Admin only. Rejected with 400 when
/// the threshold ordering invariant would break; prior values stay live.
pub async fn update_settings(
    State(proxy): State<Arc<ProxyState>>,
    AuthExtractor(context): AuthExtractor,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<SettingsView>> {
    context.require_admin()?;
    let merged = update.apply_to(&proxy.settings());
    let applied = proxy.update_settings(merged)?;
    tracing::info!(by = %context.username, "settings updated");
    Ok(Json(applied.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}
