//! System-activity log rows

use crate::auth::AuthExtractor;
use crate::db::{DbClient, SysLogRefs};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSysLogRequest {
    pub message: String,
    #[serde(default)]
    pub restriction_id: Option<i32>,
    #[serde(default)]
    pub model_id: Option<i32>,
    #[serde(default)]
    pub signature_id: Option<i32>,
    #[serde(default)]
    pub user_id: Option<i32>,
    #[serde(default)]
    pub sus_user_id: Option<i32>,
    #[serde(default)]
    pub report_id: Option<i32>,
    #[serde(default)]
    pub wl_id: Option<i32>,
}

/// SysLog row with its derived source label.
#[derive(Debug, Clone, Serialize)]
pub struct SysLogView {
    pub log_id: i32,
    pub source: String,
    pub message: String,
    pub severity: String,
    pub timestamp: i64,
}

/// GET /api/syslogs - recent system activity with derived sources.
pub async fn list_syslogs(State(db): State<DbClient>) -> ApiResult<Json<Vec<SysLogView>>> {
    let rows = db.syslog_list(200).await?;
    let views = rows
        .into_iter()
        .map(|log| SysLogView {
            log_id: log.slog_id,
            source: log.source().to_string(),
            severity: "Info".to_string(),
            timestamp: log.slog_timestamp.timestamp_millis(),
            message: log.message,
        })
        .collect();
    Ok(Json(views))
}

/// POST /api/syslogs - record a system event. Any authenticated role.
pub async fn create_syslog(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateSysLogRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if request.message.is_empty() {
        return Err(ApiError::missing_field("message"));
    }
    let refs = SysLogRefs {
        restriction_id: request.restriction_id,
        model_id: request.model_id,
        signature_id: request.signature_id,
        user_id: request.user_id,
        sus_user_id: request.sus_user_id,
        report_id: request.report_id,
        wl_id: request.wl_id,
    };
    let log = db.syslog_create(&request.message, &refs).await?;
    tracing::debug!(slog_id = log.slog_id, by = %context.username, "system log recorded");
    Ok((StatusCode::CREATED, Json(serde_json::to_value(&log)?)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/syslogs", get(list_syslogs).post(create_syslog))
}
