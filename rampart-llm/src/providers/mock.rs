//! Deterministic mock provider
//!
//! Used when no credentials are configured so the analysis surface works
//! end-to-end in development and tests without burning API quota.

use crate::CompletionProvider;
use async_trait::async_trait;
use rampart_core::LlmError;
use serde_json::{json, Value};

/// Mock provider returning a fixed, schema-compliant report.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _system_prompt: &str, _user_prompt: &str) -> Result<Value, LlmError> {
        Ok(json!({
            "attack_type": "SQL Injection (Mock)",
            "root_cause": "Improper sanitization of user input in database queries.",
            "risk_level": "critical",
            "mitigations": [
                {"category": "code", "description": "Use parameterized queries or prepared statements."},
                {"category": "config", "description": "Minimize database user privileges."}
            ],
            "virtual_patches": [
                {"target": "WAF", "rule": "Block requests containing 'UNION SELECT' or 'OR 1=1'"}
            ],
            "references": [
                {"standard": "OWASP", "id": "A03:2021", "title": "Injection"}
            ]
        }))
    }
}
