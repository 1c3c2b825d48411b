//! Log ingest from the detection pipeline

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::IngestResponse;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use rampart_core::{attack_type_from_reason, detection_source_from_reason, RequestRecord};

/// POST /api/ingest_log - persist a forwarded pipeline record as a WAFLog
/// row; non-safe verdicts additionally raise an Alert referencing it.
pub async fn ingest_log(
    State(db): State<DbClient>,
    AuthExtractor(_context): AuthExtractor,
    Json(record): Json<RequestRecord>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let message = format!("{} {} - {}", record.method, record.url, record.reason);
    let wlog_type = attack_type_from_reason(&record.reason).to_string();
    let severity = record.severity().to_string();
    let source = detection_source_from_reason(&record.reason);

    let log = db
        .waf_log_insert(&message, &wlog_type, &severity, source)
        .await?;

    let alert_id = if record.verdict.is_alerting() {
        let alert = db.alert_create(&wlog_type, Some(log.wlog_id)).await?;
        Some(alert.alert_id)
    } else {
        None
    };

    tracing::debug!(wlog_id = log.wlog_id, ?alert_id, "record ingested");
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            wlog_id: log.wlog_id,
            alert_id,
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/ingest_log", post(ingest_log))
}
