//! Completion provider implementations
//!
//! Concrete backends behind the [`CompletionProvider`](crate::CompletionProvider)
//! trait: an OpenAI-compatible remote endpoint, a local Ollama endpoint, and
//! a deterministic mock used when no credentials are configured.

mod local;
mod mock;
mod remote;

pub use local::LocalProvider;
pub use mock::MockProvider;
pub use remote::RemoteProvider;

use rampart_core::LlmError;
use serde_json::Value;

/// Strip markdown code fences some models wrap around JSON output, then
/// parse the remainder.
pub(crate) fn parse_json_content(provider: &str, content: &str) -> Result<Value, LlmError> {
    let cleaned = if content.contains("```json") {
        content.replace("```json", "").replace("```", "")
    } else if content.contains("```") {
        content.replace("```", "")
    } else {
        content.to_string()
    };

    serde_json::from_str(cleaned.trim()).map_err(|e| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: format!("output is not valid JSON: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let value = parse_json_content("test", r#"{"a": 1}"#).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_json_fences() {
        let value = parse_json_content("test", "```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_bare_fences() {
        let value = parse_json_content("test", "```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_json_content("test", "not json at all").is_err());
    }
}
