//! Rampart LLM - Attack Analysis Layer
//!
//! Provider-agnostic completion trait with three implementations (an
//! OpenAI-compatible remote endpoint, a local Ollama endpoint, and a
//! deterministic mock), plus the analysis service that turns captured
//! attack descriptions into structured mitigation reports.

mod analysis;
pub mod providers;

use async_trait::async_trait;
use rampart_core::LlmError;
use serde_json::Value;
use std::sync::Arc;

pub use analysis::{AnalysisOutcome, AnalysisService, ANALYSIS_CACHE_TTL};
pub use providers::{LocalProvider, MockProvider, RemoteProvider};

// ============================================================================
// COMPLETION PROVIDER TRAIT
// ============================================================================

/// A JSON-mode completion backend. Implementations must be thread-safe.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate a completion and return it parsed as JSON.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<Value, LlmError>;
}

// ============================================================================
// PROVIDER CONFIGURATION
// ============================================================================

/// Which completion backend to use. Selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Remote,
    Local,
    Mock,
}

/// LLM configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub remote_url: String,
    pub local_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Remote,
            remote_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            local_url: "http://localhost:11434".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Load from `RAMPART_LLM_*` environment variables.
    pub fn from_env() -> Self {
        let provider = match std::env::var("RAMPART_LLM_PROVIDER")
            .unwrap_or_else(|_| "remote".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => ProviderKind::Local,
            "mock" => ProviderKind::Mock,
            _ => ProviderKind::Remote,
        };

        Self {
            provider,
            remote_url: std::env::var("RAMPART_LLM_REMOTE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string()),
            local_url: std::env::var("RAMPART_LLM_LOCAL_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: std::env::var("RAMPART_LLM_MODEL").unwrap_or_else(|_| match provider {
                ProviderKind::Local => "llama3".to_string(),
                _ => "llama-3.3-70b-versatile".to_string(),
            }),
            api_key: std::env::var("RAMPART_LLM_API_KEY").ok(),
        }
    }

    /// Build the configured provider. A remote selection without an API key
    /// degrades to the mock provider so the analysis surface keeps working.
    pub fn build_provider(&self) -> Arc<dyn CompletionProvider> {
        match self.provider {
            ProviderKind::Remote => match &self.api_key {
                Some(key) => Arc::new(RemoteProvider::new(
                    self.remote_url.clone(),
                    key.clone(),
                    self.model.clone(),
                )),
                None => {
                    tracing::warn!("no LLM API key configured, falling back to mock provider");
                    Arc::new(MockProvider::new())
                }
            },
            ProviderKind::Local => Arc::new(LocalProvider::new(
                self.local_url.clone(),
                self.model.clone(),
            )),
            ProviderKind::Mock => Arc::new(MockProvider::new()),
        }
    }
}
