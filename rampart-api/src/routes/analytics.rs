//! Analytics views derived from the event store and the journal
//!
//! KPIs, paginated log views, 30-day traffic, the OWASP category
//! breakdown, and the 7x24 anomaly heatmap come from the relational store;
//! the realtime stats endpoint reads the journal and the live request
//! counter.

use crate::db::DbClient;
use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::{
    HeatmapResponse, KpiResponse, LogView, LogsResponse, OwaspBreakdown, PageQuery, StatsResponse,
    TrafficResponse,
};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Timelike, Utc};
use rampart_core::Verdict;
use rampart_proxy::ProxyState;
use std::sync::Arc;

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/kpis - headline dashboard numbers.
pub async fn kpis(
    State(db): State<DbClient>,
    State(proxy): State<Arc<ProxyState>>,
) -> ApiResult<Json<KpiResponse>> {
    let blocked_attacks = db.waf_log_blocked_count().await?;
    let false_positives = db.whitelist_count().await?;
    let model_confidence = db.model_confidence().await?;

    Ok(Json(KpiResponse {
        total_requests: proxy.request_count(),
        blocked_attacks,
        false_positives,
        model_confidence,
    }))
}

/// GET /api/logs?limit&offset - paginated event-store log view, most
/// recent first.
pub async fn logs(
    State(db): State<DbClient>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<LogsResponse>> {
    let total = db.waf_log_count().await?;
    let rows = db
        .waf_log_list(page.limit_or(100), page.offset_or_zero())
        .await?;

    let logs = rows
        .into_iter()
        .map(|log| LogView {
            id: log.wlog_id,
            log_type: log_type_for_severity(&log.severity).to_string(),
            severity: log.severity,
            message: log.intercepted_req,
            timestamp: log.wlog_timestamp.timestamp_millis(),
        })
        .collect();

    Ok(Json(LogsResponse { logs, total }))
}

/// GET /api/traffic - daily request counts for the last 30 days.
pub async fn traffic(State(db): State<DbClient>) -> ApiResult<Json<TrafficResponse>> {
    let timestamps = db.waf_log_timestamps_since(30).await?;
    Ok(Json(TrafficResponse {
        traffic_data: daily_counts(&timestamps, Utc::now(), 30),
    }))
}

/// GET /api/owasp - category breakdown over WAFLog types.
pub async fn owasp(State(db): State<DbClient>) -> ApiResult<Json<OwaspBreakdown>> {
    let counts = db.waf_log_counts_by_type().await?;
    let mut breakdown = OwaspBreakdown::default();
    for (wlog_type, count) in counts {
        match wlog_type.as_str() {
            "SQLi" => breakdown.sqli += count,
            "XSS" => breakdown.xss += count,
            "CSRF" => breakdown.csrf += count,
            "Command Injection" => breakdown.command_injection += count,
            "Path Traversal" => breakdown.path_traversal += count,
            _ => {}
        }
    }
    Ok(Json(breakdown))
}

/// GET /api/heatmap - 7x24 hourly anomaly counts, normalized to the
/// maximum cell.
pub async fn heatmap(State(db): State<DbClient>) -> ApiResult<Json<HeatmapResponse>> {
    let timestamps = db.waf_log_timestamps_since(7).await?;
    Ok(Json(HeatmapResponse {
        heatmap: heatmap_cells(&timestamps, Utc::now()),
    }))
}

/// GET /api/stats - realtime counters from the journal and the live
/// request counter.
pub async fn stats(State(proxy): State<Arc<ProxyState>>) -> ApiResult<Json<StatsResponse>> {
    let records = proxy.journal.load_all()?;
    let hour_ago = Utc::now().timestamp() as f64 - 3600.0;

    let mut blocked_last_hour = 0;
    let mut allowed_last_hour = 0;
    let mut alerts_last_hour = 0;
    let mut total_blocked = 0;
    let mut total_alerts = 0;

    for record in &records {
        match record.verdict {
            Verdict::Blocked => {
                total_blocked += 1;
                if record.ts > hour_ago {
                    blocked_last_hour += 1;
                }
            }
            Verdict::Alert => {
                total_alerts += 1;
                if record.ts > hour_ago {
                    alerts_last_hour += 1;
                }
            }
            _ => {
                if record.ts > hour_ago {
                    allowed_last_hour += 1;
                }
            }
        }
    }

    Ok(Json(StatsResponse {
        total_requests: proxy.request_count(),
        blocked_last_hour,
        allowed_last_hour,
        alerts_last_hour,
        total_blocked,
        total_alerts,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kpis", get(kpis))
        .route("/logs", get(logs))
        .route("/traffic", get(traffic))
        .route("/owasp", get(owasp))
        .route("/heatmap", get(heatmap))
        .route("/stats", get(stats))
}

// ============================================================================
// BUCKETING
// ============================================================================

fn log_type_for_severity(severity: &str) -> &'static str {
    match severity {
        "Critical" | "High" => "Attack",
        "Medium" => "Warning",
        _ => "Info",
    }
}

/// Count rows per calendar day over the trailing window, oldest first.
fn daily_counts(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, days: i64) -> Vec<i64> {
    let today = now.date_naive();
    let mut counts = vec![0i64; days as usize];
    for ts in timestamps {
        let age_days = (today - ts.date_naive()).num_days();
        if (0..days).contains(&age_days) {
            counts[(days - 1 - age_days) as usize] += 1;
        }
    }
    counts
}

/// 7x24 grid of hourly anomaly counts normalized to the maximum cell. Row
/// 0 is six calendar days ago, row 6 is today; columns are hours 0-23.
fn heatmap_cells(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<Vec<f64>> {
    let today = now.date_naive();
    let mut counts = vec![vec![0u32; 24]; 7];

    for ts in timestamps {
        let age_days = (today - ts.date_naive()).num_days();
        if (0..7).contains(&age_days) {
            let day = (6 - age_days) as usize;
            let hour = ts.hour() as usize;
            counts[day][hour] += 1;
        }
    }

    let max = counts
        .iter()
        .flat_map(|row| row.iter())
        .copied()
        .max()
        .unwrap_or(0);

    counts
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    if max == 0 {
                        0.0
                    } else {
                        f64::from(cell) / f64::from(max)
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 30, 0).unwrap()
    }

    #[test]
    fn heatmap_buckets_by_calendar_day_and_hour() {
        let now = at(2026, 8, 1, 12);
        let timestamps = vec![
            at(2026, 8, 1, 9),  // today, hour 9
            at(2026, 8, 1, 9),  // today, hour 9
            at(2026, 7, 31, 23), // yesterday, hour 23
            at(2026, 7, 26, 0), // six days ago, hour 0
            at(2026, 7, 20, 5), // outside the window
        ];

        let grid = heatmap_cells(&timestamps, now);
        assert_eq!(grid.len(), 7);
        assert!(grid.iter().all(|row| row.len() == 24));

        // Max cell is today 9:00 with two hits, so it normalizes to 1.0.
        assert_eq!(grid[6][9], 1.0);
        assert_eq!(grid[5][23], 0.5);
        assert_eq!(grid[0][0], 0.5);
        // The out-of-window row contributed nothing.
        let total: f64 = grid.iter().flatten().sum();
        assert_eq!(total, 2.0);
    }

    #[test]
    fn heatmap_of_nothing_is_all_zero() {
        let grid = heatmap_cells(&[], at(2026, 8, 1, 12));
        assert!(grid.iter().flatten().all(|&cell| cell == 0.0));
    }

    #[test]
    fn daily_counts_are_oldest_first() {
        let now = at(2026, 8, 1, 12);
        let timestamps = vec![
            at(2026, 8, 1, 9),
            at(2026, 8, 1, 10),
            at(2026, 7, 3, 4),
        ];
        let counts = daily_counts(&timestamps, now, 30);
        assert_eq!(counts.len(), 30);
        assert_eq!(counts[29], 2); // today
        assert_eq!(counts[0], 1); // 29 days ago
    }

    #[test]
    fn severity_maps_to_log_type() {
        assert_eq!(log_type_for_severity("Critical"), "Attack");
        assert_eq!(log_type_for_severity("High"), "Attack");
        assert_eq!(log_type_for_severity("Medium"), "Warning");
        assert_eq!(log_type_for_severity("Low"), "Info");
    }
}
