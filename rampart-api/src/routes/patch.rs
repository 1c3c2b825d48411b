//! LLM-backed mitigation analysis

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::PatchRecommendRequest;
use axum::{extract::State, routing::post, Json, Router};
use rampart_llm::AnalysisService;
use serde_json::Value;
use std::sync::Arc;

/// POST /api/patch/recommend - analyze an attack description into a
/// structured mitigation report. The report (or its schema-compliant
/// fallback) is persisted as a PatchingReport row; the response carries
/// `_cached` so repeat callers can tell replays apart.
pub async fn recommend_patch(
    State(db): State<DbClient>,
    State(analysis): State<Arc<AnalysisService>>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<PatchRecommendRequest>,
) -> ApiResult<Json<Value>> {
    if request.attack_description.is_empty() {
        return Err(ApiError::missing_field("attack_description"));
    }

    let outcome = analysis
        .analyze(&request.attack_description, request.context.as_ref())
        .await?;

    // Replays were already persisted on first generation.
    if !outcome.cached {
        let details = serde_json::to_string(&outcome.report)?;
        let report = db.report_create(&details, request.wlog_id).await?;
        tracing::info!(
            report_id = report.report_id,
            by = %context.username,
            "mitigation report persisted"
        );
    }

    let mut body = outcome.report;
    if let Some(map) = body.as_object_mut() {
        map.insert("_cached".to_string(), Value::Bool(outcome.cached));
    }
    Ok(Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/patch/recommend", post(recommend_patch))
}
