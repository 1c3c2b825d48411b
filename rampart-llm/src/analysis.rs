//! Attack analysis service
//!
//! Turns a captured attack description into a structured mitigation report:
//! sanitize, consult the per-hash cache, rate-limit, call the configured
//! provider, validate the schema, and fall back to a schema-compliant
//! failure report so downstream consumers never branch on success.

use crate::CompletionProvider;
use rampart_core::{sanitize_description, LlmError, REQUIRED_REPORT_KEYS};
use rampart_store::{SlidingWindowLimiter, TtlCache};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

/// Identical descriptions are served from cache for 24 hours.
pub const ANALYSIS_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Analysis generation is limited to 10 calls per minute.
const ANALYSIS_LIMIT: usize = 10;
const ANALYSIS_WINDOW: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = r#"You are a cybersecurity analyst assistant.
You provide defensive security analysis only.
You must NOT generate exploit code or attack steps.
Your task is to explain attacks and recommend mitigations and patches.

Return results in STRICT JSON format with the following schema:
{
  "attack_type": "string",
  "root_cause": "string",
  "risk_level": "low|medium|high|critical",
  "mitigations": [
    { "category": "code|config|waf", "description": "string" }
  ],
  "virtual_patches": [
    { "target": "WAF|Nginx|App", "rule": "string" }
  ],
  "references": [
    { "standard": "OWASP|CWE|NIST", "id": "string", "title": "string" }
  ]
}
"#;

/// Result of an analysis request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    /// The report JSON (provider output or the failure fallback).
    pub report: Value,
    /// Whether the report came from the 24 h cache.
    pub cached: bool,
}

/// LLM-backed attack analyzer with caching, rate limiting, and fallback.
pub struct AnalysisService {
    provider: Arc<dyn CompletionProvider>,
    cache: TtlCache<String, Value>,
    limiter: SlidingWindowLimiter,
}

impl AnalysisService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_limits(provider, ANALYSIS_LIMIT, ANALYSIS_WINDOW, ANALYSIS_CACHE_TTL)
    }

    pub fn with_limits(
        provider: Arc<dyn CompletionProvider>,
        limit: usize,
        window: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            cache: TtlCache::new(cache_ttl),
            limiter: SlidingWindowLimiter::new(limit, window),
        }
    }

    /// Analyze an attack description.
    ///
    /// Returns `Err(LlmError::RateLimited)` when the limiter denies the
    /// call; every other failure path resolves to the fallback report.
    pub async fn analyze(
        &self,
        description: &str,
        context: Option<&Value>,
    ) -> Result<AnalysisOutcome, LlmError> {
        let safe_description = sanitize_description(description);
        let key = description_hash(&safe_description);

        if let Some(report) = self.cache.get(&key) {
            return Ok(AnalysisOutcome {
                report,
                cached: true,
            });
        }

        let decision = self.limiter.allow();
        if !decision.is_allowed() {
            return Err(LlmError::RateLimited {
                retry_after_secs: decision.retry_after_secs(),
            });
        }

        let user_prompt = build_user_prompt(&safe_description, context);
        let report = match self.provider.generate(SYSTEM_PROMPT, &user_prompt).await {
            Ok(report) => match validate_report(&report) {
                Ok(()) => report,
                Err(e) => {
                    tracing::warn!(provider = self.provider.name(), error = %e, "schema-incomplete analysis");
                    return Ok(AnalysisOutcome {
                        report: fallback_report(&safe_description, &e.to_string()),
                        cached: false,
                    });
                }
            },
            Err(e) => {
                tracing::error!(provider = self.provider.name(), error = %e, "analysis generation failed");
                return Ok(AnalysisOutcome {
                    report: fallback_report(&safe_description, &e.to_string()),
                    cached: false,
                });
            }
        };

        // Only successful reports are cached; a transient provider failure
        // must not pin the fallback for 24 hours.
        self.cache.insert(key, report.clone());
        Ok(AnalysisOutcome {
            report,
            cached: false,
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// SHA-256 of the sanitized description, hex-encoded.
fn description_hash(sanitized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sanitized.as_bytes());
    hex::encode(hasher.finalize())
}

fn build_user_prompt(description: &str, context: Option<&Value>) -> String {
    let mut prompt = format!(
        "Given the following attack description:\n\"{}\"\n\n\
         Tasks:\n\
         1. Classify the attack type\n\
         2. Explain the root cause\n\
         3. Provide concrete remediation steps\n\
         4. Suggest virtual patching actions (WAF or config)\n\
         5. Reference relevant standards (OWASP, CWE)\n\n\
         Return STRICT JSON only.\n",
        description
    );
    if let Some(ctx) = context {
        prompt.push_str(&format!("\nAdditional context: {}\n", ctx));
    }
    prompt
}

/// Every required top-level key must be present.
fn validate_report(report: &Value) -> Result<(), LlmError> {
    for key in REQUIRED_REPORT_KEYS {
        if report.get(key).is_none() {
            return Err(LlmError::SchemaIncomplete(key.to_string()));
        }
    }
    Ok(())
}

/// Schema-compliant report describing the analysis failure itself.
fn fallback_report(description: &str, error_msg: &str) -> Value {
    let excerpt: String = description.chars().take(50).collect();
    json!({
        "attack_type": "Security Incident (Analysis Failed)",
        "root_cause": "Could not determine specifics due to analysis service unavailability.",
        "risk_level": "medium",
        "mitigations": [
            {"category": "config", "description": "Enable WAF blocking mode."},
            {"category": "code", "description": format!("Review logs for suspicious activity matching: {}", excerpt)}
        ],
        "virtual_patches": [],
        "references": [],
        "error": format!("analysis failed: {}", error_msg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use async_trait::async_trait;

    /// Provider that always fails, for exercising the fallback path.
    struct FailingProvider;

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _s: &str, _u: &str) -> Result<Value, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "failing".into(),
                message: "connection refused".into(),
            })
        }
    }

    /// Provider that returns JSON missing required keys.
    struct IncompleteProvider;

    #[async_trait]
    impl CompletionProvider for IncompleteProvider {
        fn name(&self) -> &str {
            "incomplete"
        }

        async fn generate(&self, _s: &str, _u: &str) -> Result<Value, LlmError> {
            Ok(json!({"attack_type": "SQLi"}))
        }
    }

    #[tokio::test]
    async fn second_identical_call_is_cached() {
        let service = AnalysisService::new(Arc::new(MockProvider::new()));

        let first = service.analyze("UNION SELECT 1", None).await.unwrap();
        assert!(!first.cached);

        let second = service.analyze("UNION SELECT 1", None).await.unwrap();
        assert!(second.cached);
        assert_eq!(first.report, second.report);
    }

    #[tokio::test]
    async fn different_descriptions_miss_the_cache() {
        let service = AnalysisService::new(Arc::new(MockProvider::new()));
        service.analyze("attack one", None).await.unwrap();
        let other = service.analyze("attack two", None).await.unwrap();
        assert!(!other.cached);
    }

    #[tokio::test]
    async fn rate_limit_denial_is_an_error_with_retry_after() {
        let service = AnalysisService::with_limits(
            Arc::new(MockProvider::new()),
            1,
            Duration::from_secs(60),
            ANALYSIS_CACHE_TTL,
        );
        service.analyze("first", None).await.unwrap();

        let err = service.analyze("second", None).await.unwrap_err();
        match err {
            LlmError::RateLimited { retry_after_secs } => assert!(retry_after_secs <= 60),
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn provider_failure_returns_schema_compliant_fallback() {
        let service = AnalysisService::new(Arc::new(FailingProvider));
        let outcome = service.analyze("some attack", None).await.unwrap();

        for key in REQUIRED_REPORT_KEYS {
            assert!(outcome.report.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(outcome.report["attack_type"], "Security Incident (Analysis Failed)");
        assert!(outcome.report["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn fallback_is_not_cached() {
        let service = AnalysisService::new(Arc::new(FailingProvider));
        service.analyze("some attack", None).await.unwrap();
        let second = service.analyze("some attack", None).await.unwrap();
        assert!(!second.cached);
    }

    #[tokio::test]
    async fn schema_incomplete_output_falls_back() {
        let service = AnalysisService::new(Arc::new(IncompleteProvider));
        let outcome = service.analyze("some attack", None).await.unwrap();
        assert_eq!(outcome.report["attack_type"], "Security Incident (Analysis Failed)");
        assert!(outcome.report["error"].as_str().unwrap().contains("root_cause"));
    }

    #[tokio::test]
    async fn secrets_are_redacted_before_the_provider_sees_them() {
        /// Captures the prompt it was handed.
        struct CapturingProvider(std::sync::Mutex<Vec<String>>);

        #[async_trait]
        impl CompletionProvider for CapturingProvider {
            fn name(&self) -> &str {
                "capture"
            }

            async fn generate(&self, _s: &str, u: &str) -> Result<Value, LlmError> {
                self.0.lock().unwrap().push(u.to_string());
                MockProvider::new().generate(_s, u).await
            }
        }

        let provider = Arc::new(CapturingProvider(std::sync::Mutex::new(Vec::new())));
        let service = AnalysisService::new(provider.clone());
        service
            .analyze("payload with Authorization: Bearer abc123", None)
            .await
            .unwrap();

        let prompts = provider.0.lock().unwrap();
        assert!(prompts[0].contains("[REDACTED]"));
        assert!(!prompts[0].contains("Authorization:"));
    }
}
