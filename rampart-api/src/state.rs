//! Shared application state for the control-plane router

use crate::auth::TokenSet;
use crate::db::DbClient;
use crate::training::TrainingState;
use rampart_intel::IntelService;
use rampart_llm::AnalysisService;
use rampart_proxy::ProxyState;
use std::sync::Arc;

/// Application-wide state shared across all control-plane routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbClient,
    pub tokens: Arc<TokenSet>,
    /// Pipeline state: rules, live settings, score cache, journal, counter.
    pub proxy: Arc<ProxyState>,
    pub intel: Arc<IntelService>,
    pub analysis: Arc<AnalysisService>,
    pub training: Arc<TrainingState>,
}

crate::impl_from_ref!(DbClient, db);
crate::impl_from_ref!(Arc<TokenSet>, tokens);
crate::impl_from_ref!(Arc<ProxyState>, proxy);
crate::impl_from_ref!(Arc<IntelService>, intel);
crate::impl_from_ref!(Arc<AnalysisService>, analysis);
crate::impl_from_ref!(Arc<TrainingState>, training);
