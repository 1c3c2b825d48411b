//! OpenAI-compatible remote completion provider

use crate::CompletionProvider;
use async_trait::async_trait;
use rampart_core::LlmError;
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat-completions provider for OpenAI-compatible APIs (Groq, OpenRouter,
/// and the upstream itself).
pub struct RemoteProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl RemoteProvider {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for RemoteProvider {
    fn name(&self) -> &str {
        "remote"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<Value, LlmError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": 0.2,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "remote".to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                provider: "remote".to_string(),
                message: format!("status {}", status),
            });
        }

        let data: Value = response.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: "remote".to_string(),
            reason: format!("body is not JSON: {}", e),
        })?;

        let content = data["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: "remote".to_string(),
                reason: "missing choices[0].message.content".to_string(),
            })?;

        super::parse_json_content("remote", content)
    }
}

impl std::fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
