//! Rampart server entry point
//!
//! Bootstraps configuration, the relational store (schema + seed), the
//! compiled signature set, the journal, and the provider services, then
//! serves the unified router: control plane under /api, detection pipeline
//! for everything else.

use std::sync::Arc;

use rampart_api::{
    create_api_router, hash_password, ApiConfig, ApiError, ApiResult, AppState, AuthContext,
    DbClient, DbConfig, TokenSet, TrainingState,
};
use rampart_core::Role;
use rampart_intel::{IntelConfig, IntelService};
use rampart_llm::{AnalysisService, LlmConfig};
use rampart_proxy::{ProxyState, RuleSet};
use rampart_store::Journal;

#[tokio::main]
async fn main() -> ApiResult<()> {
    rampart_api::init_tracing();

    let config = ApiConfig::from_env();

    let db = DbClient::from_config(&DbConfig::from_env())?;
    db.ensure_schema().await?;
    let admin_hash = hash_password(&config.admin_password)?;
    db.seed_defaults(&config.admin_username, &admin_hash, &config.admin_email)
        .await?;

    let rules = Arc::new(RuleSet::load(&config.signature_path)?);
    tracing::info!(
        rules = rules.len(),
        path = %config.signature_path,
        "signature set compiled"
    );

    let journal = Arc::new(Journal::open(&config.journal_path)?);
    let proxy = Arc::new(
        ProxyState::new(rules, config.settings.clone(), journal)
            .with_ingest(config.ingest_url.clone(), config.ingest_token.clone()),
    );

    let tokens = Arc::new(TokenSet::new());
    match &config.ingest_token {
        Some(token) => {
            tokens.insert(token.clone(), AuthContext::new("pipeline", Role::Analyst));
        }
        None if config.ingest_url.is_some() => {
            tracing::warn!("RAMPART_INGEST_TOKEN unset; pipeline events will be rejected with 401");
        }
        None => {}
    }

    let intel = Arc::new(IntelService::new(IntelConfig::from_env()));
    let analysis = Arc::new(AnalysisService::new(LlmConfig::from_env().build_provider()));

    let state = AppState {
        db,
        tokens,
        proxy: proxy.clone(),
        intel,
        analysis,
        training: Arc::new(TrainingState::new()),
    };

    let app = create_api_router(state, proxy);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| {
            ApiError::internal_error(format!("Failed to bind {}: {}", config.bind_addr, e))
        })?;
    tracing::info!(addr = %config.bind_addr, "Rampart WAF listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
