//! Threat-intelligence lookups and feeds
//!
//! Lookups first consult the local Restriction block list; an exact match
//! short-circuits without spending provider quota. Missing API keys are a
//! server configuration error, quota denials are 429 with `retry_after`,
//! and provider failures surface as 502.

use crate::db::DbClient;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::types::TiQuery;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use rampart_core::IndicatorKind;
use rampart_intel::{FeedSnapshot, IntelService, TiProvider, TiVerdict};
use std::sync::Arc;

fn parse_query(query: &TiQuery, implied_kind: Option<IndicatorKind>) -> ApiResult<(IndicatorKind, String)> {
    let kind = match implied_kind {
        Some(kind) => kind,
        None => {
            let raw = query
                .kind
                .as_deref()
                .ok_or_else(|| ApiError::missing_field("type"))?;
            IndicatorKind::parse(raw).ok_or_else(|| {
                ApiError::invalid_input(format!(
                    "Invalid type: {}. Must be 'ip', 'domain', or 'hash'",
                    raw
                ))
            })?
        }
    };
    let value = query
        .value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing_field("value"))?;
    Ok((kind, value.to_string()))
}

async fn lookup(
    db: &DbClient,
    intel: &IntelService,
    provider: TiProvider,
    kind: IndicatorKind,
    value: &str,
) -> ApiResult<TiVerdict> {
    // Local block-list hit answers without touching provider quota.
    if db.restriction_exists(kind, value).await? {
        return Ok(TiVerdict::local_match(kind, value));
    }
    Ok(intel.lookup(provider, kind, value).await?)
}

/// GET /api/ti/virustotal?type&value
pub async fn virustotal(
    State(db): State<DbClient>,
    State(intel): State<Arc<IntelService>>,
    Query(query): Query<TiQuery>,
) -> ApiResult<Json<TiVerdict>> {
    let (kind, value) = parse_query(&query, None)?;
    Ok(Json(
        lookup(&db, &intel, TiProvider::VirusTotal, kind, &value).await?,
    ))
}

/// GET /api/ti/otx?type&value
pub async fn otx(
    State(db): State<DbClient>,
    State(intel): State<Arc<IntelService>>,
    Query(query): Query<TiQuery>,
) -> ApiResult<Json<TiVerdict>> {
    let (kind, value) = parse_query(&query, None)?;
    Ok(Json(lookup(&db, &intel, TiProvider::Otx, kind, &value).await?))
}

/// GET /api/ti/abuseipdb?value - IP-only scorer, the type is implied.
pub async fn abuseipdb(
    State(db): State<DbClient>,
    State(intel): State<Arc<IntelService>>,
    Query(query): Query<TiQuery>,
) -> ApiResult<Json<TiVerdict>> {
    let (kind, value) = parse_query(&query, Some(IndicatorKind::Ip))?;
    Ok(Json(
        lookup(&db, &intel, TiProvider::AbuseIpDb, kind, &value).await?,
    ))
}

/// GET /api/ti/feed/abuseipdb - blacklist snapshot (12 h cache).
pub async fn feed_abuseipdb(
    State(intel): State<Arc<IntelService>>,
) -> ApiResult<Json<FeedSnapshot>> {
    Ok(Json(intel.feed_abuseipdb().await?))
}

/// GET /api/ti/feed/otx - subscribed pulses snapshot (1 h cache).
pub async fn feed_otx(State(intel): State<Arc<IntelService>>) -> ApiResult<Json<FeedSnapshot>> {
    Ok(Json(intel.feed_otx().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ti/virustotal", get(virustotal))
        .route("/ti/otx", get(otx))
        .route("/ti/abuseipdb", get(abuseipdb))
        .route("/ti/feed/abuseipdb", get(feed_abuseipdb))
        .route("/ti/feed/otx", get(feed_otx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_requires_type_and_value() {
        let query = TiQuery {
            kind: None,
            value: Some("1.2.3.4".into()),
        };
        assert!(parse_query(&query, None).is_err());

        let query = TiQuery {
            kind: Some("ip".into()),
            value: None,
        };
        assert!(parse_query(&query, None).is_err());

        let query = TiQuery {
            kind: Some("ip".into()),
            value: Some("1.2.3.4".into()),
        };
        let (kind, value) = parse_query(&query, None).unwrap();
        assert_eq!(kind, IndicatorKind::Ip);
        assert_eq!(value, "1.2.3.4");
    }

    #[test]
    fn abuseipdb_implies_ip_kind() {
        let query = TiQuery {
            kind: None,
            value: Some("1.2.3.4".into()),
        };
        let (kind, _) = parse_query(&query, Some(IndicatorKind::Ip)).unwrap();
        assert_eq!(kind, IndicatorKind::Ip);
    }

    #[test]
    fn invalid_kind_is_rejected() {
        let query = TiQuery {
            kind: Some("url".into()),
            value: Some("x".into()),
        };
        assert!(parse_query(&query, None).is_err());
    }
}
