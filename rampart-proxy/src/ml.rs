//! Client for the external anomaly-scoring service
//!
//! The ML service is strictly advisory on the hot path: any failure
//! (network, non-200, parse) degrades to a score of 0.0 so the pipeline
//! never blocks traffic because the scorer is down.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Hard budget for the scoring call.
const SCORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Canonical scoring payload: the full header map plus the flattened named
/// headers the feature extractor reads directly.
#[derive(Debug, Clone, Serialize)]
pub struct MlRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub user_agent: String,
    pub accept: String,
    pub host: String,
    pub cookie: String,
    pub content_type: String,
    pub content_length: usize,
    pub body: String,
}

impl MlRequest {
    /// Assemble the payload from captured request parts. Header names are
    /// already lowercased by the capture step.
    pub fn from_parts(method: &str, url: &str, headers: &BTreeMap<String, String>, body: &str) -> Self {
        let get = |name: &str| headers.get(name).cloned().unwrap_or_default();
        Self {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            user_agent: get("user-agent"),
            accept: get("accept"),
            host: get("host"),
            cookie: get("cookie"),
            content_type: get("content-type"),
            content_length: body.len(),
            body: body.to_string(),
        }
    }
}

#[derive(Serialize)]
struct PredictBody<'a> {
    raw_request: &'a MlRequest,
}

/// Thin client over the scoring endpoint.
#[derive(Debug, Clone)]
pub struct MlClient {
    client: reqwest::Client,
}

impl MlClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// POST the payload and return the score, failing open to 0.0.
    pub async fn score(&self, service_url: &str, request: &MlRequest) -> f64 {
        let response = self
            .client
            .post(service_url)
            .timeout(SCORE_TIMEOUT)
            .json(&PredictBody { raw_request: request })
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "ML service unreachable, scoring 0.0");
                return 0.0;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "ML service returned non-200, scoring 0.0");
            return 0.0;
        }

        match response.json::<Value>().await {
            Ok(data) => match data["score"].as_f64() {
                Some(score) => score.clamp(0.0, 1.0),
                None => {
                    tracing::warn!("ML response missing score field, scoring 0.0");
                    0.0
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "ML response is not JSON, scoring 0.0");
                0.0
            }
        }
    }
}

impl Default for MlClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn headers() -> BTreeMap<String, String> {
        let mut h = BTreeMap::new();
        h.insert("user-agent".to_string(), "curl/8.0".to_string());
        h.insert("host".to_string(), "shop.example".to_string());
        h.insert("cookie".to_string(), "session=abc".to_string());
        h
    }

    #[tokio::test]
    async fn successful_score_is_returned() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/predict")
                .json_body_partial(r#"{"raw_request": {"method": "POST", "user_agent": "curl/8.0"}}"#);
            then.status(200).json_body(json!({"score": 0.92}));
        });

        let client = MlClient::new();
        let request = MlRequest::from_parts("POST", "/items", &headers(), "{\"q\":1}");
        let score = client.score(&server.url("/predict"), &request).await;
        mock.assert();
        assert_eq!(score, 0.92);
    }

    #[tokio::test]
    async fn unreachable_service_fails_open() {
        let client = MlClient::new();
        let request = MlRequest::from_parts("GET", "/", &BTreeMap::new(), "");
        let score = client.score("http://127.0.0.1:1/predict", &request).await;
        assert_eq!(score, 0.0);
    }

    #[tokio::test]
    async fn non_200_fails_open() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(500).body("model exploded");
        });

        let client = MlClient::new();
        let request = MlRequest::from_parts("GET", "/", &BTreeMap::new(), "");
        assert_eq!(client.score(&server.url("/predict"), &request).await, 0.0);
    }

    #[tokio::test]
    async fn malformed_body_fails_open() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).body("not json");
        });

        let client = MlClient::new();
        let request = MlRequest::from_parts("GET", "/", &BTreeMap::new(), "");
        assert_eq!(client.score(&server.url("/predict"), &request).await, 0.0);
    }

    #[tokio::test]
    async fn score_is_clamped_to_unit_interval() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(json!({"score": 3.7}));
        });

        let client = MlClient::new();
        let request = MlRequest::from_parts("GET", "/", &BTreeMap::new(), "");
        assert_eq!(client.score(&server.url("/predict"), &request).await, 1.0);
    }

    #[test]
    fn content_length_tracks_body_bytes() {
        let request = MlRequest::from_parts("POST", "/items", &headers(), "abcd");
        assert_eq!(request.content_length, 4);
        assert_eq!(request.cookie, "session=abc");
        assert_eq!(request.content_type, "");
    }
}
