//! Alert listing and acknowledgement

use crate::auth::AuthExtractor;
use crate::db::{AlertFilter, DbClient};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::{AlertView, AlertsQuery, AlertsResponse};
use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

const ALERT_STATUSES: [&str; 3] = ["open", "acknowledged", "resolved"];

#[derive(Debug, Clone, Deserialize)]
pub struct AlertUpdateRequest {
    pub status: String,
}

/// GET /api/alerts?status&severity - recent alerts joined with their WAF
/// log for severity and description.
pub async fn list_alerts(
    State(db): State<DbClient>,
    Query(query): Query<AlertsQuery>,
) -> ApiResult<Json<AlertsResponse>> {
    let filter = AlertFilter {
        status: query.status,
        severity: query.severity,
        limit: query.limit.unwrap_or(10).clamp(1, 500),
    };
    let rows = db.alert_list(&filter).await?;

    let alerts = rows
        .into_iter()
        .map(|(alert, log)| AlertView {
            id: alert.alert_id,
            alert_type: alert.alert_type,
            severity: log
                .as_ref()
                .map(|l| l.severity.clone())
                .unwrap_or_else(|| "Medium".to_string()),
            status: alert.status,
            description: log
                .as_ref()
                .map(|l| truncate(&l.intercepted_req, 200))
                .unwrap_or_default(),
            timestamp: alert.created_at.timestamp_millis(),
        })
        .collect();

    Ok(Json(AlertsResponse { alerts }))
}

/// PUT /api/alerts/{id} - acknowledge or resolve an alert. Any
/// authenticated role may do this.
pub async fn update_alert(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(alert_id): Path<i32>,
    Json(request): Json<AlertUpdateRequest>,
) -> ApiResult<Json<rampart_core::Alert>> {
    if !ALERT_STATUSES.contains(&request.status.as_str()) {
        return Err(ApiError::invalid_input(format!(
            "Invalid status: {}. Must be one of {:?}",
            request.status, ALERT_STATUSES
        )));
    }

    let alert = db.alert_update_status(alert_id, &request.status).await?;
    tracing::info!(alert_id, status = %request.status, by = %context.username, "alert updated");
    Ok(Json(alert))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(list_alerts))
        .route("/alerts/:id", put(update_alert))
}
