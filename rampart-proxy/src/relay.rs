//! Upstream relay
//!
//! Clones the inspected request to the protected upstream with its original
//! path+query, headers minus `Host`, and body, then relays the upstream's
//! status and body back to the client.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::BTreeMap;

/// Forward the captured request upstream. Connection failures surface as a
/// 502 with a small JSON diagnostic. No timeout of our own: the call is
/// bounded by the client's, and cancellation propagates when the client
/// disconnects.
pub async fn forward_upstream(
    client: &reqwest::Client,
    upstream_base: &str,
    method: &str,
    path_and_query: &str,
    headers: &BTreeMap<String, String>,
    body: Vec<u8>,
) -> Response {
    let target = format!(
        "{}{}",
        upstream_base.trim_end_matches('/'),
        path_and_query
    );

    let method = match reqwest::Method::from_bytes(method.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                json!({"detail": "Unsupported method"}),
            )
        }
    };

    let mut request = client.request(method, &target);
    for (name, value) in headers {
        if name == "host" {
            continue;
        }
        request = request.header(name, value);
    }

    match request.body(body).send().await {
        Ok(upstream) => {
            let status =
                StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = upstream
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let bytes = upstream.bytes().await.unwrap_or_default();

            let mut response = Response::builder().status(status);
            if let Some(ct) = content_type {
                if let Ok(value) = HeaderValue::from_str(&ct) {
                    response = response.header(header::CONTENT_TYPE, value);
                }
            }
            response
                .body(Body::from(bytes))
                .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, target = %target, "upstream unavailable");
            error_response(
                StatusCode::BAD_GATEWAY,
                json!({"detail": "Upstream unavailable", "error": e.to_string()}),
            )
        }
    }
}

fn error_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}
