//! Local Ollama completion provider

use crate::CompletionProvider;
use async_trait::async_trait;
use rampart_core::LlmError;
use serde_json::{json, Value};
use std::time::Duration;

// Local inference is slower than hosted endpoints.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider for a local Ollama endpoint with forced JSON output.
pub struct LocalProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl LocalProvider {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<Value, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = json!({
            "model": self.model,
            "system": system_prompt,
            "prompt": user_prompt,
            "stream": false,
            "format": "json",
        });

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "local".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                provider: "local".to_string(),
                message: format!("status {}", status),
            });
        }

        let data: Value = response.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: "local".to_string(),
            reason: format!("body is not JSON: {}", e),
        })?;

        let content = data["response"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "local".to_string(),
                reason: "missing response field".to_string(),
            })?;

        super::parse_json_content("local", content)
    }
}

impl std::fmt::Debug for LocalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
