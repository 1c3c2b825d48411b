//! Patching report listing and downloads

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::render::{report_csv, report_pdf};
use crate::state::AppState;
use crate::types::PageQuery;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rampart_core::PatchingReport;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadQuery {
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// GET /api/reports?limit&offset
pub async fn list_reports(
    State(db): State<DbClient>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<PatchingReport>>> {
    Ok(Json(
        db.report_list(page.limit_or(50), page.offset_or_zero())
            .await?,
    ))
}

/// GET /api/reports/{id}
pub async fn get_report(
    State(db): State<DbClient>,
    Path(report_id): Path<i32>,
) -> ApiResult<Json<PatchingReport>> {
    Ok(Json(db.report_get(report_id).await?))
}

/// GET /api/reports/{id}/download?format=csv|pdf
pub async fn download_report(
    State(db): State<DbClient>,
    Path(report_id): Path<i32>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<Response> {
    let report = db.report_get(report_id).await?;

    let (content_type, filename, bytes) = match query.format.as_str() {
        "csv" => (
            "text/csv",
            format!("report-{}.csv", report_id),
            report_csv(&report).into_bytes(),
        ),
        "pdf" => (
            "application/pdf",
            format!("report-{}.pdf", report_id),
            report_pdf(&report),
        ),
        other => {
            return Err(ApiError::invalid_input(format!(
                "Invalid format: {}. Must be 'csv' or 'pdf'",
                other
            )))
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/reports/{id} - any authenticated role.
pub async fn delete_report(
    State(db): State<DbClient>,
    AuthExtractor(_context): AuthExtractor,
    Path(report_id): Path<i32>,
) -> ApiResult<StatusCode> {
    db.report_delete(report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/:id", get(get_report).delete(delete_report))
        .route("/reports/:id/download", get(download_report))
}
