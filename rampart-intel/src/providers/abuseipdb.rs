//! AbuseIPDB API shim

use crate::TiVerdict;
use rampart_core::{IndicatorKind, IntelError, TiRisk};
use serde::Serialize;
use serde_json::Value;

/// One entry of the blacklist feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlacklistEntry {
    pub ip: Option<String>,
    pub score: Option<i64>,
    pub country: Option<String>,
    #[serde(rename = "reportDate")]
    pub report_date: Option<String>,
}

/// Client for the AbuseIPDB check and blacklist endpoints. IP-only.
pub struct AbuseIpDbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AbuseIpDbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.abuseipdb.com/api/v2".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub async fn lookup(&self, kind: IndicatorKind, value: &str) -> Result<TiVerdict, IntelError> {
        if kind != IndicatorKind::Ip {
            return Err(IntelError::InvalidIndicator(format!(
                "abuseipdb only scores IP addresses, got {}",
                kind
            )));
        }

        let url = format!("{}/check", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("ipAddress", value), ("maxAgeInDays", "90")])
            .timeout(super::LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| super::transport_error("abuseipdb", e))?;

        // 422 means the IP itself is malformed.
        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(IntelError::InvalidIndicator(
                "invalid IP address format".to_string(),
            ));
        }
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TiVerdict::not_found("abuseipdb", kind, value, "AbuseIPDB"));
        }
        if !response.status().is_success() {
            return Err(super::status_error("abuseipdb", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| super::transport_error("abuseipdb", e))?;
        Ok(normalize(value, data))
    }

    /// Pull the high-confidence blacklist feed (10 entries, confidence 90+).
    pub async fn feed(&self) -> Result<Vec<BlacklistEntry>, IntelError> {
        let url = format!("{}/blacklist", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Key", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("limit", "10"), ("confidenceMinimum", "90")])
            .timeout(super::FEED_TIMEOUT)
            .send()
            .await
            .map_err(|e| super::transport_error("abuseipdb", e))?;

        if !response.status().is_success() {
            return Err(super::status_error("abuseipdb", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| super::transport_error("abuseipdb", e))?;

        let entries = data["data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| BlacklistEntry {
                        ip: item["ipAddress"].as_str().map(String::from),
                        score: item["abuseConfidenceScore"].as_i64(),
                        country: item["countryCode"].as_str().map(String::from),
                        report_date: item["lastReportedAt"].as_str().map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(entries)
    }
}

/// Confidence-score bands: 0 clean, under 25 low, under 75 medium, else high.
fn normalize(value: &str, data: Value) -> TiVerdict {
    let score = data["data"]["abuseConfidenceScore"].as_i64().unwrap_or(0);

    let risk = if score == 0 {
        TiRisk::Clean
    } else if score < 25 {
        TiRisk::Low
    } else if score < 75 {
        TiRisk::Medium
    } else {
        TiRisk::High
    };

    TiVerdict {
        provider: "abuseipdb".to_string(),
        kind: IndicatorKind::Ip,
        value: value.to_string(),
        risk,
        summary: format!("Abuse Confidence Score: {}%", score),
        raw: Some(data),
    }
}

impl std::fmt::Debug for AbuseIpDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbuseIpDbClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
