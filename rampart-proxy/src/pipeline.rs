//! Pipeline orchestration
//!
//! Order on the hot path: capture, signature scan (fast reject), cached ML
//! score, classification, then deny or relay. The journal entry is written
//! for every inspected request except safe traffic with safe-logging off.
//! Signature matches always block, even when the ML service and the journal
//! are both failing.

use self::PipelineDecision::{Scored, SignatureBlock};
use crate::relay::forward_upstream;
use crate::{MlRequest, ProxyState};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rampart_core::{
    fingerprint, url_decode, RequestRecord, Verdict, VerdictBand, WafSettings, BODY_CAPTURE_CAP,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// What the detection stack decided about one request.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineDecision {
    /// An enabled signature matched; always blocks.
    SignatureBlock { rule_id: String },
    /// No signature hit; the ML score put the request in this band.
    Scored { score: f64, band: VerdictBand },
}

/// Run the detection stack over captured request parts.
pub async fn inspect(
    state: &ProxyState,
    settings: &WafSettings,
    method: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
    body_text: &str,
    url_decoded: &str,
) -> PipelineDecision {
    if let Some(rule_id) = state.rules.scan(body_text, url_decoded) {
        tracing::info!(rule = %rule_id, %url, "signature match");
        return SignatureBlock { rule_id };
    }

    let key = fingerprint(body_text, url_decoded);
    let score = match state.score_cache.get(&key) {
        Some(cached) => {
            tracing::debug!(score = cached, "score cache hit");
            cached
        }
        None => {
            let request = MlRequest::from_parts(method, url, headers, body_text);
            let score = state.ml.score(&settings.ml_service_url, &request).await;
            state.score_cache.insert(key, score);
            score
        }
    };

    let band = settings.thresholds.classify(score);
    Scored { score, band }
}

/// Axum handler for every request that is not control-plane traffic.
pub async fn handle_request(State(state): State<Arc<ProxyState>>, request: Request) -> Response {
    state.count_request();

    let (parts, body) = request.into_parts();
    let method = parts.method.as_str().to_string();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let mut headers = BTreeMap::new();
    for (name, value) in parts.headers.iter() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_lowercase(), v.to_string());
        }
    }

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read request body");
            Vec::new()
        }
    };
    let captured_len = body_bytes.len().min(BODY_CAPTURE_CAP);
    let body_text = String::from_utf8_lossy(&body_bytes[..captured_len]).into_owned();
    let url_decoded = url_decode(&path_and_query);

    let settings = state.settings();
    let decision = inspect(
        &state,
        &settings,
        &method,
        &path_and_query,
        &headers,
        &body_text,
        &url_decoded,
    )
    .await;

    match decision {
        SignatureBlock { rule_id } => {
            let record = RequestRecord {
                ts: now_epoch(),
                method,
                url: path_and_query,
                headers,
                body: body_text,
                verdict: Verdict::Blocked,
                reason: RequestRecord::signature_reason(&rule_id),
                score: None,
            };
            journal(&state, &record);
            spawn_event(&state, record);

            json_response(
                StatusCode::FORBIDDEN,
                json!({"detail": "Blocked by signature", "id": rule_id}),
            )
        }
        Scored { score, band } => {
            let verdict = band.verdict();
            let record = RequestRecord {
                ts: now_epoch(),
                method: method.clone(),
                url: path_and_query.clone(),
                headers: headers.clone(),
                body: body_text,
                verdict,
                reason: RequestRecord::ml_reason(score, band),
                score: Some(score),
            };

            if verdict != Verdict::Safe || settings.log_safe_traffic {
                journal(&state, &record);
            }
            if verdict.is_alerting() {
                spawn_event(&state, record);
            }

            if verdict == Verdict::Blocked {
                tracing::info!(score, band = %band, "blocked by ML verdict");
                return json_response(
                    StatusCode::FORBIDDEN,
                    json!({"detail": "Blocked and reported", "score": score}),
                );
            }

            forward_upstream(
                &state.http,
                &settings.upstream_url,
                &method,
                &path_and_query,
                &headers,
                body_bytes,
            )
            .await
        }
    }
}

/// Push a non-safe record to the control-plane ingest endpoint. Failures
/// are logged and never affect the client response.
pub async fn forward_event(
    http: reqwest::Client,
    ingest_url: String,
    ingest_token: Option<String>,
    record: RequestRecord,
) {
    let mut request = http
        .post(&ingest_url)
        .timeout(Duration::from_secs(5))
        .json(&record);
    if let Some(token) = &ingest_token {
        request = request.bearer_auth(token);
    }

    match request.send().await {
        Ok(response) if !response.status().is_success() => {
            tracing::warn!(status = %response.status(), "control-plane ingest rejected event");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "control-plane ingest unreachable");
        }
    }
}

fn spawn_event(state: &ProxyState, record: RequestRecord) {
    if let Some(url) = &state.ingest_url {
        tokio::spawn(forward_event(
            state.http.clone(),
            url.clone(),
            state.ingest_token.clone(),
            record,
        ));
    }
}

fn journal(state: &ProxyState, record: &RequestRecord) {
    if let Err(e) = state.journal.append(record) {
        tracing::error!(error = %e, "journal append failed");
    }
}

fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleSet, SignatureDef};
    use axum::body::Body;
    use httpmock::prelude::*;
    use rampart_store::Journal;

    fn test_state(ml_url: &str, upstream_url: &str) -> (Arc<ProxyState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let journal = Arc::new(Journal::open(dir.path().join("requests.jsonl")).unwrap());
        let rules = Arc::new(
            RuleSet::compile(vec![SignatureDef {
                id: "SQLI_UNION_SELECT".into(),
                regex: r"union\s+select".into(),
            }])
            .unwrap(),
        );
        let mut settings = WafSettings::default();
        settings.ml_service_url = ml_url.to_string();
        settings.upstream_url = upstream_url.to_string();
        let state = Arc::new(ProxyState::new(rules, settings, journal));
        (state, dir)
    }

    fn request(method: &str, uri: &str, body: &str) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn signature_match_blocks_and_journals() {
        let (state, _dir) = test_state("http://127.0.0.1:1/predict", "http://127.0.0.1:1");

        let response = handle_request(
            State(state.clone()),
            request("GET", "/search?q=UNION%20SELECT%20password%20FROM%20users", ""),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Blocked by signature");
        assert_eq!(body["id"], "SQLI_UNION_SELECT");

        let records = state.journal.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].verdict, Verdict::Blocked);
        assert_eq!(records[0].reason, "SIG:SQLI_UNION_SELECT");
        assert!(records[0].score.is_none());
    }

    #[tokio::test]
    async fn high_score_blocks_with_score_body() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.92}));
        });
        let (state, _dir) = test_state(&ml.url("/predict"), "http://127.0.0.1:1");

        let response = handle_request(
            State(state.clone()),
            request("POST", "/items", r#"{"name": "widget"}"#),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Blocked and reported");
        assert_eq!(body["score"], 0.92);

        let records = state.journal.load_all().unwrap();
        assert_eq!(records[0].verdict, Verdict::Blocked);
        assert_eq!(records[0].reason, "ML:0.92 (very high)");
        assert_eq!(records[0].score, Some(0.92));
    }

    #[tokio::test]
    async fn repeat_request_uses_score_cache() {
        let ml = MockServer::start();
        let ml_mock = ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.92}));
        });
        let (state, _dir) = test_state(&ml.url("/predict"), "http://127.0.0.1:1");

        for _ in 0..2 {
            let response = handle_request(
                State(state.clone()),
                request("POST", "/items", r#"{"name": "widget"}"#),
            )
            .await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        ml_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn safe_request_is_relayed_upstream() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.1}));
        });
        let upstream = MockServer::start();
        upstream.mock(|when, then| {
            when.method(GET).path("/about");
            then.status(200).body("about page");
        });

        let (state, _dir) = test_state(&ml.url("/predict"), &upstream.base_url());
        let response = handle_request(State(state.clone()), request("GET", "/about", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"about page");

        // Safe logging defaults on, so the journal has a safe record.
        let records = state.journal.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].verdict, Verdict::Safe);
    }

    #[tokio::test]
    async fn safe_logging_disabled_skips_journal() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.1}));
        });
        let upstream = MockServer::start();
        upstream.mock(|when, then| {
            when.any_request();
            then.status(200).body("ok");
        });

        let (state, _dir) = test_state(&ml.url("/predict"), &upstream.base_url());
        let mut settings = state.settings();
        settings.log_safe_traffic = false;
        state.update_settings(settings).unwrap();

        handle_request(State(state.clone()), request("GET", "/about", "")).await;
        assert!(state.journal.load_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn score_exactly_at_low_is_logged_and_forwarded() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.30}));
        });
        let upstream = MockServer::start();
        let upstream_mock = upstream.mock(|when, then| {
            when.any_request();
            then.status(200).body("ok");
        });

        let (state, _dir) = test_state(&ml.url("/predict"), &upstream.base_url());
        let response = handle_request(State(state.clone()), request("GET", "/p", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        upstream_mock.assert();
        let records = state.journal.load_all().unwrap();
        assert_eq!(records[0].verdict, Verdict::Logged);
        assert_eq!(records[0].reason, "ML:0.3 (low)");
    }

    #[tokio::test]
    async fn alert_band_forwards_upstream_too() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.6}));
        });
        let upstream = MockServer::start();
        let upstream_mock = upstream.mock(|when, then| {
            when.any_request();
            then.status(200).body("ok");
        });

        let (state, _dir) = test_state(&ml.url("/predict"), &upstream.base_url());
        let response = handle_request(State(state.clone()), request("POST", "/p", "x")).await;

        assert_eq!(response.status(), StatusCode::OK);
        upstream_mock.assert();
        assert_eq!(state.journal.load_all().unwrap()[0].verdict, Verdict::Alert);
    }

    #[tokio::test]
    async fn ml_outage_fails_open_and_forwards() {
        let upstream = MockServer::start();
        upstream.mock(|when, then| {
            when.any_request();
            then.status(200).body("ok");
        });

        // ML URL points nowhere; score degrades to 0.0 and traffic flows.
        let (state, _dir) = test_state("http://127.0.0.1:1/predict", &upstream.base_url());
        let response = handle_request(State(state.clone()), request("GET", "/shop", "")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let records = state.journal.load_all().unwrap();
        assert_eq!(records[0].verdict, Verdict::Safe);
        assert_eq!(records[0].score, Some(0.0));
    }

    #[tokio::test]
    async fn empty_body_and_headers_produce_valid_record() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.0}));
        });
        let upstream = MockServer::start();
        upstream.mock(|when, then| {
            when.any_request();
            then.status(200).body("ok");
        });

        let (state, _dir) = test_state(&ml.url("/predict"), &upstream.base_url());
        let response = handle_request(State(state.clone()), request("GET", "/", "")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let records = state.journal.load_all().unwrap();
        assert_eq!(records[0].url, "/");
        assert_eq!(records[0].body, "");
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_502() {
        let ml = MockServer::start();
        ml.mock(|when, then| {
            when.method(POST).path("/predict");
            then.status(200).json_body(serde_json::json!({"score": 0.0}));
        });

        let (state, _dir) = test_state(&ml.url("/predict"), "http://127.0.0.1:1");
        let response = handle_request(State(state.clone()), request("GET", "/x", "")).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn forward_event_posts_record_with_bearer() {
        let ingest = MockServer::start();
        let ingest_mock = ingest.mock(|when, then| {
            when.method(POST)
                .path("/api/ingest_log")
                .header("authorization", "Bearer service-token")
                .json_body_partial(r#"{"verdict": "blocked"}"#);
            then.status(201);
        });

        let record = RequestRecord {
            ts: now_epoch(),
            method: "POST".into(),
            url: "/items".into(),
            headers: BTreeMap::new(),
            body: "x".into(),
            verdict: Verdict::Blocked,
            reason: "ML:0.92 (very high)".into(),
            score: Some(0.92),
        };
        forward_event(
            reqwest::Client::new(),
            ingest.url("/api/ingest_log"),
            Some("service-token".into()),
            record,
        )
        .await;

        ingest_mock.assert();
    }
}
