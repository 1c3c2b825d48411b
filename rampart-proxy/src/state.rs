//! Shared pipeline state

use crate::{MlClient, RuleSet};
use rampart_core::{ConfigError, WafSettings};
use rampart_store::{Journal, ScoreCache};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Everything the hot path shares across requests. Reads dominate on the
/// settings lock; the score cache and journal serialize internally.
pub struct ProxyState {
    pub rules: Arc<RuleSet>,
    settings: RwLock<WafSettings>,
    pub score_cache: ScoreCache,
    pub journal: Arc<Journal>,
    pub ml: MlClient,
    pub http: reqwest::Client,
    /// Control-plane ingest endpoint for non-safe events.
    pub ingest_url: Option<String>,
    /// Service token presented on ingest calls.
    pub ingest_token: Option<String>,
    request_counter: AtomicU64,
}

impl ProxyState {
    pub fn new(rules: Arc<RuleSet>, settings: WafSettings, journal: Arc<Journal>) -> Self {
        Self {
            rules,
            settings: RwLock::new(settings),
            score_cache: ScoreCache::default(),
            journal,
            ml: MlClient::new(),
            http: reqwest::Client::new(),
            ingest_url: None,
            ingest_token: None,
            request_counter: AtomicU64::new(0),
        }
    }

    pub fn with_ingest(mut self, url: Option<String>, token: Option<String>) -> Self {
        self.ingest_url = url;
        self.ingest_token = token;
        self
    }

    /// Snapshot of the live settings.
    pub fn settings(&self) -> WafSettings {
        self.settings
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Replace the live settings; rejected when the threshold ordering
    /// invariant would break, leaving the previous settings in place.
    pub fn update_settings(&self, new: WafSettings) -> Result<WafSettings, ConfigError> {
        new.thresholds.validate()?;
        let mut guard = self.settings.write().map_err(|_| ConfigError::InvalidValue {
            field: "settings".into(),
            reason: "settings lock poisoned".into(),
        })?;
        *guard = new.clone();
        Ok(new)
    }

    pub fn count_request(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn request_count(&self) -> u64 {
        self.request_counter.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for ProxyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyState")
            .field("rules", &self.rules.len())
            .field("requests", &self.request_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SignatureDef;
    use rampart_core::Thresholds;

    fn state() -> ProxyState {
        let dir = tempfile::tempdir().unwrap();
        let journal = Arc::new(Journal::open(dir.path().join("j.jsonl")).unwrap());
        let rules = Arc::new(RuleSet::compile(vec![SignatureDef {
            id: "SQLI_UNION_SELECT".into(),
            regex: "union".into(),
        }]).unwrap());
        ProxyState::new(rules, WafSettings::default(), journal)
    }

    #[test]
    fn invalid_threshold_update_is_rejected_and_state_unchanged() {
        let state = state();
        let before = state.settings();

        let mut bad = before.clone();
        bad.thresholds = Thresholds {
            very_high: 0.6,
            high: 0.8,
            medium: 0.5,
            low: 0.3,
        };
        assert!(state.update_settings(bad).is_err());
        assert_eq!(state.settings(), before);
    }

    #[test]
    fn valid_update_replaces_settings() {
        let state = state();
        let mut new = state.settings();
        new.thresholds.very_high = 0.9;
        new.log_safe_traffic = false;
        state.update_settings(new.clone()).unwrap();
        assert_eq!(state.settings(), new);
    }

    #[test]
    fn request_counter_increments() {
        let state = state();
        assert_eq!(state.request_count(), 0);
        state.count_request();
        state.count_request();
        assert_eq!(state.request_count(), 2);
    }
}
