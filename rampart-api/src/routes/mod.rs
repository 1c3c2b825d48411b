//! Control-plane REST routes
//!
//! Route handlers organized by surface. Non-mutating routes are open;
//! mutating handlers declare `AuthExtractor` and admin-scoped ones check
//! the role on the extracted context. Everything that is not control-plane
//! traffic falls through to the detection pipeline.

pub mod alerts;
pub mod analytics;
pub mod generic;
pub mod health;
pub mod ingest;
pub mod login;
pub mod models;
pub mod patch;
pub mod profiles;
pub mod reports;
pub mod restrictions;
pub mod rules;
pub mod settings;
pub mod signatures;
pub mod syslogs;
pub mod ti;
pub mod training;
pub mod users;
pub mod whitelist;

use crate::state::AppState;
use axum::routing::any;
use axum::Router;
use rampart_proxy::ProxyState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the unified router: the control plane under `/api` plus the
/// pipeline as the fallback for every other request.
pub fn create_api_router(state: AppState, pipeline: Arc<ProxyState>) -> Router {
    let api = Router::new()
        .merge(health::router())
        .merge(login::router())
        .merge(rules::router())
        .merge(settings::router())
        .merge(ingest::router())
        .merge(analytics::router())
        .merge(alerts::router())
        .merge(restrictions::router())
        .merge(signatures::router())
        .merge(profiles::router())
        .merge(models::router())
        .merge(reports::router())
        .merge(whitelist::router())
        .merge(users::router())
        .merge(syslogs::router())
        .merge(generic::router())
        .merge(ti::router())
        .merge(patch::router())
        .merge(training::router())
        // Unknown /api paths must 404 here; only non-API traffic may fall
        // through to the pipeline.
        .fallback(health::api_not_found);

    Router::new()
        .nest("/api", api)
        .route("/health", axum::routing::get(health::liveness))
        .with_state(state)
        .fallback_service(any(rampart_proxy::handle_request).with_state(pipeline))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
