//! AlienVault OTX API shim

use crate::TiVerdict;
use rampart_core::{IndicatorKind, IntelError, TiRisk};
use serde::Serialize;
use serde_json::Value;

/// One entry of the subscribed-pulses feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PulseSummary {
    pub name: Option<String>,
    pub id: Option<Value>,
    pub created: Option<String>,
    pub author: Option<String>,
    pub tags: Vec<String>,
}

/// Client for the OTX indicator and pulse endpoints.
pub struct OtxClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OtxClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://otx.alienvault.com/api/v1".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    // OTX spells indicator kinds with its own casing.
    fn endpoint(kind: IndicatorKind) -> &'static str {
        match kind {
            IndicatorKind::Ip => "IPv4",
            IndicatorKind::Domain => "domain",
            IndicatorKind::Hash => "file",
        }
    }

    pub async fn lookup(&self, kind: IndicatorKind, value: &str) -> Result<TiVerdict, IntelError> {
        let url = format!(
            "{}/indicators/{}/{}/general",
            self.base_url,
            Self::endpoint(kind),
            value
        );
        let response = self
            .client
            .get(&url)
            .header("X-OTX-API-KEY", &self.api_key)
            .timeout(super::LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| super::transport_error("otx", e))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(TiVerdict::not_found("otx", kind, value, "OTX"));
        }
        if !response.status().is_success() {
            return Err(super::status_error("otx", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| super::transport_error("otx", e))?;
        Ok(normalize(kind, value, data))
    }

    /// Pull the subscribed-pulses feed (10 most recent).
    pub async fn feed(&self) -> Result<Vec<PulseSummary>, IntelError> {
        let url = format!("{}/pulses/subscribed", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("X-OTX-API-KEY", &self.api_key)
            .query(&[("limit", "10")])
            .timeout(super::FEED_TIMEOUT)
            .send()
            .await
            .map_err(|e| super::transport_error("otx", e))?;

        if !response.status().is_success() {
            return Err(super::status_error("otx", response.status()));
        }

        let data: Value = response
            .json()
            .await
            .map_err(|e| super::transport_error("otx", e))?;

        let pulses = data["results"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|item| PulseSummary {
                        name: item["name"].as_str().map(String::from),
                        id: item.get("id").cloned(),
                        created: item["created"].as_str().map(String::from),
                        author: item["author_name"].as_str().map(String::from),
                        tags: item["tags"]
                            .as_array()
                            .map(|tags| {
                                tags.iter()
                                    .filter_map(|t| t.as_str().map(String::from))
                                    .take(3)
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(pulses)
    }
}

/// Pulse-count heuristic: no pulses is clean, 1-4 is medium, 5+ is high.
fn normalize(kind: IndicatorKind, value: &str, data: Value) -> TiVerdict {
    let pulse_count = data["pulse_info"]["count"].as_i64().unwrap_or(0);

    let risk = if pulse_count >= 5 {
        TiRisk::High
    } else if pulse_count > 0 {
        TiRisk::Medium
    } else {
        TiRisk::Clean
    };

    TiVerdict {
        provider: "otx".to_string(),
        kind,
        value: value.to_string(),
        risk,
        summary: format!("Found in {} OTX pulses", pulse_count),
        raw: Some(data),
    }
}

impl std::fmt::Debug for OtxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtxClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    async fn lookup_with_pulses(count: i64) -> TiVerdict {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/indicators/IPv4/1.2.3.4/general")
                .header("X-OTX-API-KEY", "otx-key");
            then.status(200)
                .json_body(json!({"pulse_info": {"count": count}}));
        });
        let client = OtxClient::with_base_url("otx-key".into(), server.base_url());
        client.lookup(IndicatorKind::Ip, "1.2.3.4").await.unwrap()
    }

    #[tokio::test]
    async fn pulse_thresholds() {
        assert_eq!(lookup_with_pulses(0).await.risk, TiRisk::Clean);
        assert_eq!(lookup_with_pulses(1).await.risk, TiRisk::Medium);
        assert_eq!(lookup_with_pulses(4).await.risk, TiRisk::Medium);
        assert_eq!(lookup_with_pulses(5).await.risk, TiRisk::High);
        assert_eq!(lookup_with_pulses(12).await.risk, TiRisk::High);
    }

    #[tokio::test]
    async fn summary_reports_pulse_count() {
        assert_eq!(lookup_with_pulses(3).await.summary, "Found in 3 OTX pulses");
    }

    #[tokio::test]
    async fn not_found_maps_to_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/indicators/domain/nowhere.example/general");
            then.status(404);
        });
        let client = OtxClient::with_base_url("otx-key".into(), server.base_url());
        let verdict = client
            .lookup(IndicatorKind::Domain, "nowhere.example")
            .await
            .unwrap();
        assert_eq!(verdict.risk, TiRisk::Unknown);
        assert_eq!(verdict.summary, "Not found in OTX");
    }

    #[tokio::test]
    async fn feed_truncates_tags_to_three() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/pulses/subscribed")
                .query_param("limit", "10");
            then.status(200).json_body(json!({"results": [{
                "name": "Botnet wave",
                "id": 42,
                "created": "2026-07-01T00:00:00",
                "author_name": "researcher",
                "tags": ["botnet", "c2", "malware", "extra", "more"]
            }]}));
        });
        let client = OtxClient::with_base_url("otx-key".into(), server.base_url());
        let feed = client.feed().await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].name.as_deref(), Some("Botnet wave"));
        assert_eq!(feed[0].tags, vec!["botnet", "c2", "malware"]);
    }
}
