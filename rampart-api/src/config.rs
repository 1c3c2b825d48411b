//! Server configuration
//!
//! Environment-variable driven with development defaults, prefix
//! `RAMPART_`. Provider keys and the LLM selector are read by their own
//! crates (`rampart-intel`, `rampart-llm`).

use rampart_core::{Thresholds, WafSettings};

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address for the unified listener.
    pub bind_addr: String,
    /// Signature configuration file (YAML sequence of `{id, regex}`).
    pub signature_path: String,
    /// Journal file for inspected requests.
    pub journal_path: String,
    /// Initial live WAF settings; mutable through the control plane.
    pub settings: WafSettings,
    /// Seed admin credentials, created when the users table is empty.
    pub admin_username: String,
    pub admin_password: String,
    pub admin_email: String,
    /// Ingest endpoint the pipeline pushes non-safe events to. Defaults to
    /// this process's own control plane.
    pub ingest_url: Option<String>,
    /// Pre-shared service token seeded into the token set for ingest.
    pub ingest_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            signature_path: "signatures.yml".to_string(),
            journal_path: "dataset/suspicious.jsonl".to_string(),
            settings: WafSettings::default(),
            admin_username: "admin".to_string(),
            admin_password: "change-me".to_string(),
            admin_email: "admin@rampart.local".to_string(),
            ingest_url: None,
            ingest_token: None,
        }
    }
}

impl ApiConfig {
    /// Load from `RAMPART_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_settings = WafSettings::default();

        let settings = WafSettings {
            thresholds: Thresholds {
                very_high: env_f64("RAMPART_VERY_HIGH_RISK", default_settings.thresholds.very_high),
                high: env_f64("RAMPART_HIGH_RISK", default_settings.thresholds.high),
                medium: env_f64("RAMPART_MEDIUM_RISK", default_settings.thresholds.medium),
                low: env_f64("RAMPART_LOW_RISK", default_settings.thresholds.low),
            },
            upstream_url: env_or("RAMPART_UPSTREAM_URL", &default_settings.upstream_url),
            ml_service_url: env_or("RAMPART_ML_SERVICE_URL", &default_settings.ml_service_url),
            log_safe_traffic: std::env::var("RAMPART_LOG_SAFE_TRAFFIC")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(default_settings.log_safe_traffic),
        };

        let bind_addr = env_or("RAMPART_BIND_ADDR", &defaults.bind_addr);
        let ingest_url = std::env::var("RAMPART_INGEST_URL").ok().or_else(|| {
            // Default to our own listener; the bind address 0.0.0.0 is not
            // routable, so point at loopback with the same port.
            bind_addr
                .rsplit(':')
                .next()
                .map(|port| format!("http://127.0.0.1:{}/api/ingest_log", port))
        });

        Self {
            signature_path: env_or("RAMPART_SIGNATURE_PATH", &defaults.signature_path),
            journal_path: env_or("RAMPART_JOURNAL_PATH", &defaults.journal_path),
            settings,
            admin_username: env_or("RAMPART_ADMIN_USER", &defaults.admin_username),
            admin_password: env_or("RAMPART_ADMIN_PASSWORD", &defaults.admin_password),
            admin_email: env_or("RAMPART_ADMIN_EMAIL", &defaults.admin_email),
            ingest_url,
            ingest_token: std::env::var("RAMPART_INGEST_TOKEN").ok(),
            bind_addr,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ApiConfig::default();
        assert_eq!(config.settings.thresholds, Thresholds::default());
        assert!(config.settings.log_safe_traffic);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
