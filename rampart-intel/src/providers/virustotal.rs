//! VirusTotal v3 API shim

use crate::TiVerdict;
use rampart_core::{IndicatorKind, IntelError, TiRisk};
use serde_json::Value;

/// Client for the VirusTotal v3 indicator endpoints.
pub struct VirusTotalClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://www.virustotal.com/api/v3".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    fn endpoint(kind: IndicatorKind) -> &'static str {
        match kind {
            IndicatorKind::Ip => "ip_addresses",
            IndicatorKind::Domain => "domains",
            IndicatorKind::Hash => "files",
        }
    }

    pub async fn lookup(&self, kind: IndicatorKind, value: &str) -> Result<TiVerdict, IntelError> {
        let url = format!("{}/{}/{}", self.base_url, Self::endpoint(kind), value);
        let response = self
            .client
            .get(&url)
            .header("x-apikey", &self.api_key)
            .timeout(super::LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| super::transport_error("virustotal", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TiVerdict::not_found("virustotal", kind, value, "VirusTotal"));
        }
        if !response.status().is_success() {
            return Err(super::status_error("virustotal", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| super::transport_error("virustotal", e))?;
        Ok(normalize(kind, value, data))
    }
}

/// Risk heuristic over last_analysis_stats: 0 malicious is clean (low when
/// only suspicious hits exist), 1-2 malicious is medium, more is high.
fn normalize(kind: IndicatorKind, value: &str, data: Value) -> TiVerdict {
    let stats = &data["data"]["attributes"]["last_analysis_stats"];
    let malicious = stats["malicious"].as_i64().unwrap_or(0);
    let suspicious = stats["suspicious"].as_i64().unwrap_or(0);
    let harmless = stats["harmless"].as_i64().unwrap_or(0);

    let risk = if malicious > 2 {
        TiRisk::High
    } else if malicious > 0 {
        TiRisk::Medium
    } else if suspicious > 0 {
        TiRisk::Low
    } else {
        TiRisk::Clean
    };

    TiVerdict {
        provider: "virustotal".to_string(),
        kind,
        value: value.to_string(),
        risk,
        summary: format!(
            "Malicious: {}, Suspicious: {}, Harmless: {}",
            malicious, suspicious, harmless
        ),
        raw: Some(data),
    }
}

impl std::fmt::Debug for VirusTotalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirusTotalClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
