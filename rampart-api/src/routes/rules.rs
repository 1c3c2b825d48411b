//! Signature rule listing and toggling

use crate::auth::AuthExtractor;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::RuleToggleQuery;
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use rampart_proxy::{ProxyState, RuleView};
use std::sync::Arc;

/// GET /api/rules - list every rule with its enabled flag.
pub async fn list_rules(State(proxy): State<Arc<ProxyState>>) -> Json<Vec<RuleView>> {
    Json(proxy.rules.list())
}

/// PUT /api/rules/{id}?enabled= - toggle one rule. Admin only; idempotent.
pub async fn toggle_rule(
    State(proxy): State<Arc<ProxyState>>,
    AuthExtractor(context): AuthExtractor,
    Path(rule_id): Path<String>,
    Query(query): Query<RuleToggleQuery>,
) -> ApiResult<Json<RuleView>> {
    context.require_admin()?;
    let view = proxy.rules.set_enabled(&rule_id, query.enabled)?;
    tracing::info!(rule = %rule_id, enabled = query.enabled, by = %context.username, "rule toggled");
    Ok(Json(view))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rules", get(list_rules))
        .route("/rules/:id", put(toggle_rule))
}
