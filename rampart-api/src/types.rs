//! Request/response DTOs for the control-plane API
//!
//! Wire shapes match the dashboard contract: settings use the `*_risk`
//! field names, analytics views use camelCase keys, timestamps are epoch
//! milliseconds.

use rampart_core::{Thresholds, WafSettings};
use serde::{Deserialize, Serialize};

// ============================================================================
// AUTH
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: rampart_core::User,
}

// ============================================================================
// SETTINGS
// ============================================================================

/// Live settings as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsView {
    pub very_high_risk: f64,
    pub high_risk: f64,
    pub medium_risk: f64,
    pub low_risk: f64,
    pub upstream_url: String,
    pub ml_service_url: String,
    pub log_safe_traffic: bool,
}

impl From<WafSettings> for SettingsView {
    fn from(settings: WafSettings) -> Self {
        Self {
            very_high_risk: settings.thresholds.very_high,
            high_risk: settings.thresholds.high,
            medium_risk: settings.thresholds.medium,
            low_risk: settings.thresholds.low,
            upstream_url: settings.upstream_url,
            ml_service_url: settings.ml_service_url,
            log_safe_traffic: settings.log_safe_traffic,
        }
    }
}

/// Partial settings update; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub very_high_risk: Option<f64>,
    pub high_risk: Option<f64>,
    pub medium_risk: Option<f64>,
    pub low_risk: Option<f64>,
    pub upstream_url: Option<String>,
    pub ml_service_url: Option<String>,
    pub log_safe_traffic: Option<bool>,
}

impl SettingsUpdate {
    /// Merge onto the current settings. The caller validates the result.
    pub fn apply_to(&self, current: &WafSettings) -> WafSettings {
        WafSettings {
            thresholds: Thresholds {
                very_high: self.very_high_risk.unwrap_or(current.thresholds.very_high),
                high: self.high_risk.unwrap_or(current.thresholds.high),
                medium: self.medium_risk.unwrap_or(current.thresholds.medium),
                low: self.low_risk.unwrap_or(current.thresholds.low),
            },
            upstream_url: self
                .upstream_url
                .clone()
                .unwrap_or_else(|| current.upstream_url.clone()),
            ml_service_url: self
                .ml_service_url
                .clone()
                .unwrap_or_else(|| current.ml_service_url.clone()),
            log_safe_traffic: self.log_safe_traffic.unwrap_or(current.log_safe_traffic),
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RuleToggleQuery {
    pub enabled: bool,
}

// ============================================================================
// INGEST
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub wlog_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<i32>,
}

// ============================================================================
// ANALYTICS VIEWS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResponse {
    pub total_requests: u64,
    pub blocked_attacks: i64,
    pub false_positives: i64,
    pub model_confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    pub id: i32,
    #[serde(rename = "type")]
    pub log_type: String,
    pub severity: String,
    pub message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogView>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertView {
    pub id: i32,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub status: String,
    pub description: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficResponse {
    pub traffic_data: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OwaspBreakdown {
    #[serde(rename = "SQLi")]
    pub sqli: i64,
    #[serde(rename = "XSS")]
    pub xss: i64,
    #[serde(rename = "CSRF")]
    pub csrf: i64,
    #[serde(rename = "Command Injection")]
    pub command_injection: i64,
    #[serde(rename = "Path Traversal")]
    pub path_traversal: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    /// 7 days x 24 hours, each cell normalized to the maximum cell.
    pub heatmap: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_requests: u64,
    pub blocked_last_hour: i64,
    pub allowed_last_hour: i64,
    pub alerts_last_hour: i64,
    pub total_blocked: i64,
    pub total_alerts: i64,
}

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    pub fn limit_or(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, 1000)
    }

    pub fn offset_or_zero(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsQuery {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: Option<i64>,
}

/// Query for `/api/ti/<provider>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
}

// ============================================================================
// ANALYSIS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PatchRecommendRequest {
    pub attack_description: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    #[serde(default)]
    pub wlog_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_uses_wire_names() {
        let view: SettingsView = WafSettings::default().into();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["very_high_risk"], 0.85);
        assert_eq!(json["low_risk"], 0.30);
        assert_eq!(json["log_safe_traffic"], true);
    }

    #[test]
    fn partial_update_keeps_unset_fields() {
        let current = WafSettings::default();
        let update = SettingsUpdate {
            very_high_risk: Some(0.9),
            upstream_url: Some("http://10.0.0.5:3000".into()),
            ..SettingsUpdate::default()
        };
        let merged = update.apply_to(&current);
        assert_eq!(merged.thresholds.very_high, 0.9);
        assert_eq!(merged.thresholds.high, current.thresholds.high);
        assert_eq!(merged.upstream_url, "http://10.0.0.5:3000");
        assert_eq!(merged.ml_service_url, current.ml_service_url);
    }

    #[test]
    fn kpi_serializes_camel_case() {
        let kpis = KpiResponse {
            total_requests: 10,
            blocked_attacks: 2,
            false_positives: 1,
            model_confidence: 0.87,
        };
        let json = serde_json::to_value(&kpis).unwrap();
        assert_eq!(json["totalRequests"], 10);
        assert_eq!(json["blockedAttacks"], 2);
        assert_eq!(json["falsePositives"], 1);
        assert_eq!(json["modelConfidence"], 0.87);
    }

    #[test]
    fn page_query_clamps() {
        let q = PageQuery {
            limit: Some(100_000),
            offset: Some(-5),
        };
        assert_eq!(q.limit_or(100), 1000);
        assert_eq!(q.offset_or_zero(), 0);
    }
}
