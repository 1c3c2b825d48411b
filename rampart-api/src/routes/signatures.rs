//! Custom signature CRUD (event-store rows, distinct from the compiled
//! startup rule set)

use crate::auth::AuthExtractor;
use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rampart_core::CustomSignature;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSignatureRequest {
    pub signature_type: String,
    pub signature_content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSignatureRequest {
    pub signature_type: Option<String>,
    pub signature_content: Option<String>,
}

/// GET /api/signatures
pub async fn list_signatures(State(db): State<DbClient>) -> ApiResult<Json<Vec<CustomSignature>>> {
    Ok(Json(db.signature_list().await?))
}

/// POST /api/signatures - admin only. The pattern must compile so a broken
/// regex can never reach the matching engine.
pub async fn create_signature(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Json(request): Json<CreateSignatureRequest>,
) -> ApiResult<(StatusCode, Json<CustomSignature>)> {
    context.require_admin()?;
    if request.signature_content.is_empty() {
        return Err(ApiError::missing_field("signature_content"));
    }
    validate_pattern(&request.signature_content)?;

    let signature = db
        .signature_create(&request.signature_type, &request.signature_content)
        .await?;
    Ok((StatusCode::CREATED, Json(signature)))
}

/// PUT /api/signatures/{id} - admin only.
pub async fn update_signature(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(signature_id): Path<i32>,
    Json(request): Json<UpdateSignatureRequest>,
) -> ApiResult<Json<CustomSignature>> {
    context.require_admin()?;
    if let Some(content) = &request.signature_content {
        validate_pattern(content)?;
    }
    let signature = db
        .signature_update(
            signature_id,
            request.signature_type.as_deref(),
            request.signature_content.as_deref(),
        )
        .await?;
    Ok(Json(signature))
}

/// DELETE /api/signatures/{id} - admin only.
pub async fn delete_signature(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(signature_id): Path<i32>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    db.signature_delete(signature_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_pattern(pattern: &str) -> ApiResult<()> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|_| ())
        .map_err(|e| ApiError::invalid_input(format!("Invalid regex: {}", e)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signatures", get(list_signatures).post(create_signature))
        .route(
            "/signatures/:id",
            axum::routing::put(update_signature).delete(delete_signature),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_validation() {
        assert!(validate_pattern(r"union\s+select").is_ok());
        assert!(validate_pattern("(unclosed").is_err());
    }
}
