//! Router-level tests for the control-plane surface
//!
//! These exercise the auth boundary, rule toggling, settings invariants,
//! the training stub, and the pipeline fallback without a database: the
//! connection pool is lazy, so routes that never touch it run against a
//! plain config. DB-backed flows live behind the `db-tests` feature.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use rampart_api::{
    create_api_router, AppState, AuthContext, DbClient, DbConfig, TokenSet, TrainingState,
};
use rampart_core::{Role, WafSettings};
use rampart_intel::IntelService;
use rampart_llm::{AnalysisService, LlmConfig, ProviderKind};
use rampart_proxy::{ProxyState, RuleSet, SignatureDef};
use rampart_store::Journal;
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    app: Router,
    tokens: Arc<TokenSet>,
    proxy: Arc<ProxyState>,
    _journal_dir: tempfile::TempDir,
}

fn harness(settings: WafSettings) -> Harness {
    let journal_dir = tempfile::tempdir().unwrap();
    let journal = Arc::new(Journal::open(journal_dir.path().join("requests.jsonl")).unwrap());
    let rules = Arc::new(
        RuleSet::compile(vec![
            SignatureDef {
                id: "SQLI_UNION_SELECT".into(),
                regex: r"union\s+select".into(),
            },
            SignatureDef {
                id: "XSS_SCRIPT_TAG".into(),
                regex: r"<script[^>]*>".into(),
            },
        ])
        .unwrap(),
    );
    let proxy = Arc::new(ProxyState::new(rules, settings, journal));
    let tokens = Arc::new(TokenSet::new());

    let llm = LlmConfig {
        provider: ProviderKind::Mock,
        ..LlmConfig::default()
    };
    let state = AppState {
        db: DbClient::from_config(&DbConfig::default()).unwrap(),
        tokens: tokens.clone(),
        proxy: proxy.clone(),
        intel: Arc::new(IntelService::from_clients(None, None, None)),
        analysis: Arc::new(AnalysisService::new(llm.build_provider())),
        training: Arc::new(TrainingState::new()),
    };

    Harness {
        app: create_api_router(state, proxy.clone()),
        tokens,
        proxy,
        _journal_dir: journal_dir,
    }
}

fn default_harness() -> Harness {
    harness(WafSettings::default())
}

fn admin_token(harness: &Harness) -> String {
    harness.tokens.mint(AuthContext::new("root", Role::Admin))
}

fn analyst_token(harness: &Harness) -> String {
    harness.tokens.mint(AuthContext::new("eve", Role::Analyst))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, body)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn put_json(path: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn rules_listing_is_open() {
    let h = default_harness();
    let (status, body) = send(&h.app, get("/api/rules")).await;
    assert_eq!(status, StatusCode::OK);
    let rules = body.as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["id"], "SQLI_UNION_SELECT");
    assert_eq!(rules[0]["enabled"], true);
}

#[tokio::test]
async fn rule_toggle_requires_token() {
    let h = default_harness();
    let (status, _) = send(
        &h.app,
        Request::builder()
            .method("PUT")
            .uri("/api/rules/SQLI_UNION_SELECT?enabled=false")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No state changed: the rule still matches.
    assert!(h.proxy.rules.scan("", "/q=union select 1").is_some());
}

#[tokio::test]
async fn rule_toggle_requires_admin_role() {
    let h = default_harness();
    let token = analyst_token(&h);
    let (status, _) = send(
        &h.app,
        Request::builder()
            .method("PUT")
            .uri("/api/rules/SQLI_UNION_SELECT?enabled=false")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rule_toggle_round_trip_is_idempotent() {
    let h = default_harness();
    let token = admin_token(&h);

    for _ in 0..2 {
        let (status, body) = send(
            &h.app,
            Request::builder()
                .method("PUT")
                .uri("/api/rules/SQLI_UNION_SELECT?enabled=false")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], false);
    }
    assert!(h.proxy.rules.scan("", "/q=union select 1").is_none());

    let (status, _) = send(
        &h.app,
        Request::builder()
            .method("PUT")
            .uri("/api/rules/NO_SUCH_RULE?enabled=true")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_read_is_open_and_uses_wire_names() {
    let h = default_harness();
    let (status, body) = send(&h.app, get("/api/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["very_high_risk"], 0.85);
    assert_eq!(body["low_risk"], 0.3);
}

#[tokio::test]
async fn settings_update_rejects_broken_ordering() {
    let h = default_harness();
    let token = admin_token(&h);

    let (status, _) = send(
        &h.app,
        put_json(
            "/api/settings",
            Some(&token),
            serde_json::json!({"very_high_risk": 0.6, "high_risk": 0.8}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Prior thresholds remain live.
    let (_, body) = send(&h.app, get("/api/settings")).await;
    assert_eq!(body["very_high_risk"], 0.85);
    assert_eq!(body["high_risk"], 0.7);
}

#[tokio::test]
async fn settings_partial_update_applies() {
    let h = default_harness();
    let token = admin_token(&h);

    let (status, body) = send(
        &h.app,
        put_json(
            "/api/settings",
            Some(&token),
            serde_json::json!({"very_high_risk": 0.9, "log_safe_traffic": false}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["very_high_risk"], 0.9);
    assert_eq!(body["log_safe_traffic"], false);
    assert_eq!(body["high_risk"], 0.7);
}

#[tokio::test]
async fn settings_update_without_token_is_401() {
    let h = default_harness();
    let (status, _) = send(
        &h.app,
        put_json("/api/settings", None, serde_json::json!({"low_risk": 0.1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&h.app, get("/api/settings")).await;
    assert_eq!(body["low_risk"], 0.3);
}

#[tokio::test]
async fn training_start_conflicts_while_running() {
    let h = default_harness();
    let token = admin_token(&h);

    let (status, body) = send(&h.app, get("/api/training/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["in_progress"], false);

    let start = |token: String| {
        Request::builder()
            .method("POST")
            .uri("/api/training/start")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&h.app, start(token.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&h.app, start(token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn non_api_traffic_falls_through_to_the_pipeline() {
    let h = default_harness();

    // Signature hit: blocked before the upstream is ever needed.
    let (status, body) = send(
        &h.app,
        get("/search?q=UNION%20SELECT%20password%20FROM%20users"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Blocked by signature");
    assert_eq!(body["id"], "SQLI_UNION_SELECT");

    let records = h.proxy.journal.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].reason, "SIG:SQLI_UNION_SELECT");
}

#[tokio::test]
async fn pipeline_relays_clean_traffic_through_the_router() {
    let ml = MockServer::start();
    ml.mock(|when, then| {
        when.method(POST).path("/predict");
        then.status(200).json_body(serde_json::json!({"score": 0.05}));
    });
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(GET).path("/about");
        then.status(200).body("hello from upstream");
    });

    let mut settings = WafSettings::default();
    settings.ml_service_url = ml.url("/predict");
    settings.upstream_url = upstream.base_url();
    let h = harness(settings);

    let response = h.app.clone().oneshot(get("/about")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"hello from upstream");
}

#[tokio::test]
async fn patch_recommend_requires_token() {
    let h = default_harness();
    let (status, _) = send(
        &h.app,
        Request::builder()
            .method("POST")
            .uri("/api/patch/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({"attack_description": "UNION SELECT"}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
