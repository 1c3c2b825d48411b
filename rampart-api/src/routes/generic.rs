//! Generic admin access over a closed table registry
//!
//! `/api/db/{table}` dispatches by table name against a fixed allow-list;
//! nothing is reflected from user input. Every operation requires the
//! admin role. Tables whose rows are produced by the pipeline (waf_logs,
//! alerts) only support the operations that make sense for them.

use crate::auth::{hash_password, AuthExtractor};
use crate::db::{DbClient, SysLogRefs};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rampart_core::{IndicatorKind, Role};
use serde_json::Value;

use super::alerts::AlertUpdateRequest;
use super::models::{CreateModelRequest, UpdateModelRequest};
use super::profiles::ProfileRequest;
use super::restrictions::CreateRestrictionRequest;
use super::signatures::{CreateSignatureRequest, UpdateSignatureRequest};
use super::syslogs::CreateSysLogRequest;
use super::users::{CreateUserRequest, UpdateUserRequest};
use super::whitelist::CreateWhitelistRequest;

/// The closed registry. Unknown names are 404, never reflected.
const TABLES: [&str; 10] = [
    "users",
    "waf_logs",
    "alerts",
    "restrictions",
    "signatures",
    "models",
    "reports",
    "profiles",
    "whitelist",
    "syslogs",
];

fn check_table(table: &str) -> ApiResult<()> {
    if TABLES.contains(&table) {
        Ok(())
    } else {
        Err(ApiError::not_found("Unknown table"))
    }
}

fn unsupported(table: &str, op: &str) -> ApiError {
    ApiError::invalid_input(format!("{} is not supported for table {}", op, table))
}

fn parse<T: serde::de::DeserializeOwned>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body).map_err(|e| ApiError::invalid_input(format!("Invalid body: {}", e)))
}

fn rows<T: serde::Serialize>(items: Vec<T>) -> ApiResult<Json<Vec<Value>>> {
    let values = items
        .into_iter()
        .map(|item| serde_json::to_value(&item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(values))
}

/// GET /api/db/{table} - list rows. Admin only.
pub async fn list_table(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(table): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    context.require_admin()?;
    check_table(&table)?;

    match table.as_str() {
        "users" => rows(db.user_list().await?),
        "waf_logs" => rows(db.waf_log_list(500, 0).await?),
        "alerts" => rows(
            db.alert_list(&crate::db::AlertFilter {
                status: None,
                severity: None,
                limit: 500,
            })
            .await?
            .into_iter()
            .map(|(alert, _)| alert)
            .collect(),
        ),
        "restrictions" => rows(db.restriction_list().await?),
        "signatures" => rows(db.signature_list().await?),
        "models" => rows(db.model_list().await?),
        "reports" => rows(db.report_list(500, 0).await?),
        "profiles" => rows(db.profile_list().await?),
        "whitelist" => rows(db.whitelist_list().await?),
        "syslogs" => rows(db.syslog_list(500).await?),
        _ => unreachable!("table checked against the registry"),
    }
}

/// POST /api/db/{table} - insert a row. Admin only.
pub async fn create_row(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    context.require_admin()?;
    check_table(&table)?;

    let row = match table.as_str() {
        "users" => {
            let req: CreateUserRequest = parse(body)?;
            let role = req
                .role
                .as_deref()
                .map(|r| Role::parse(r).ok_or_else(|| ApiError::invalid_input("Invalid role")))
                .transpose()?
                .unwrap_or(Role::User);
            let hash = hash_password(&req.password)?;
            serde_json::to_value(
                db.user_create(&req.username, &hash, &req.email, role).await?,
            )?
        }
        "restrictions" => {
            let req: CreateRestrictionRequest = parse(body)?;
            let kind = IndicatorKind::parse(&req.kind)
                .ok_or_else(|| ApiError::invalid_input("Invalid restriction type"))?;
            serde_json::to_value(db.restriction_create(kind, &req.value).await?)?
        }
        "signatures" => {
            let req: CreateSignatureRequest = parse(body)?;
            serde_json::to_value(
                db.signature_create(&req.signature_type, &req.signature_content)
                    .await?,
            )?
        }
        "models" => {
            let req: CreateModelRequest = parse(body)?;
            serde_json::to_value(
                db.model_create(
                    &req.model_type,
                    req.model_description.as_deref(),
                    req.model_threshold,
                )
                .await?,
            )?
        }
        "profiles" => {
            let req: ProfileRequest = parse(body)?;
            serde_json::to_value(db.profile_create(&req.into_params()?).await?)?
        }
        "whitelist" => {
            let req: CreateWhitelistRequest = parse(body)?;
            serde_json::to_value(
                db.whitelist_create(req.wlog_id, &req.reason, req.user_id)
                    .await?,
            )?
        }
        "syslogs" => {
            let req: CreateSysLogRequest = parse(body)?;
            let refs = SysLogRefs {
                restriction_id: req.restriction_id,
                model_id: req.model_id,
                signature_id: req.signature_id,
                user_id: req.user_id,
                sus_user_id: req.sus_user_id,
                report_id: req.report_id,
                wl_id: req.wl_id,
            };
            serde_json::to_value(db.syslog_create(&req.message, &refs).await?)?
        }
        other => return Err(unsupported(other, "POST")),
    };

    Ok((StatusCode::CREATED, Json(row)))
}

/// PUT /api/db/{table}/{id} - update a row. Admin only.
pub async fn update_row(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path((table, id)): Path<(String, i32)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    context.require_admin()?;
    check_table(&table)?;

    let row = match table.as_str() {
        "users" => {
            let req: UpdateUserRequest = parse(body)?;
            let role = req
                .role
                .as_deref()
                .map(|r| Role::parse(r).ok_or_else(|| ApiError::invalid_input("Invalid role")))
                .transpose()?;
            let hash = match &req.password {
                Some(password) => Some(hash_password(password)?),
                None => None,
            };
            serde_json::to_value(
                db.user_update(id, req.email.as_deref(), role, hash.as_deref())
                    .await?,
            )?
        }
        "alerts" => {
            let req: AlertUpdateRequest = parse(body)?;
            serde_json::to_value(db.alert_update_status(id, &req.status).await?)?
        }
        "signatures" => {
            let req: UpdateSignatureRequest = parse(body)?;
            serde_json::to_value(
                db.signature_update(
                    id,
                    req.signature_type.as_deref(),
                    req.signature_content.as_deref(),
                )
                .await?,
            )?
        }
        "models" => {
            let req: UpdateModelRequest = parse(body)?;
            serde_json::to_value(
                db.model_update(
                    id,
                    req.model_type.as_deref(),
                    req.model_description.as_deref(),
                    req.model_threshold,
                )
                .await?,
            )?
        }
        "profiles" => {
            let req: ProfileRequest = parse(body)?;
            serde_json::to_value(db.profile_update(id, &req.into_params()?).await?)?
        }
        other => return Err(unsupported(other, "PUT")),
    };

    Ok(Json(row))
}

/// DELETE /api/db/{table}/{id} - delete a row. Admin only.
pub async fn delete_row(
    State(db): State<DbClient>,
    AuthExtractor(context): AuthExtractor,
    Path((table, id)): Path<(String, i32)>,
) -> ApiResult<StatusCode> {
    context.require_admin()?;
    check_table(&table)?;

    match table.as_str() {
        "users" => db.user_delete(id).await?,
        "restrictions" => db.restriction_delete(id).await?,
        "signatures" => db.signature_delete(id).await?,
        "models" => db.model_delete(id).await?,
        "reports" => db.report_delete(id).await?,
        "profiles" => db.profile_delete(id).await?,
        "whitelist" => db.whitelist_delete(id).await?,
        other => return Err(unsupported(other, "DELETE")),
    }

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/db/:table", get(list_table).post(create_row))
        .route(
            "/db/:table/:id",
            axum::routing::put(update_row).delete(delete_row),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_closed() {
        assert!(check_table("users").is_ok());
        assert!(check_table("syslogs").is_ok());
        assert!(check_table("pg_catalog").is_err());
        assert!(check_table("users; DROP TABLE users").is_err());
    }
}
