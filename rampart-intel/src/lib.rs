//! Rampart Intel - Threat Intelligence Layer
//!
//! Shims over three third-party TI providers (VirusTotal, AlienVault OTX,
//! AbuseIPDB) that normalize provider responses into a common verdict shape,
//! plus the lookup service that fronts them with TTL caches and
//! provider-specific sliding-window rate limits.

pub mod providers;
mod service;

use rampart_core::{IndicatorKind, TiRisk};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use providers::{AbuseIpDbClient, OtxClient, VirusTotalClient};
pub use service::{
    FeedSnapshot, IntelConfig, IntelService, TiProvider, FEED_TTL_ABUSEIPDB, FEED_TTL_OTX,
    INDICATOR_CACHE_TTL,
};

/// Normalized verdict for one (provider, indicator) lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiVerdict {
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: IndicatorKind,
    pub value: String,
    pub risk: TiRisk,
    pub summary: String,
    /// The provider's raw response; absent for not-found and local matches.
    pub raw: Option<Value>,
}

impl TiVerdict {
    /// Verdict for an indicator the provider has never seen.
    pub fn not_found(provider: &str, kind: IndicatorKind, value: &str, label: &str) -> Self {
        Self {
            provider: provider.to_string(),
            kind,
            value: value.to_string(),
            risk: TiRisk::Unknown,
            summary: format!("Not found in {}", label),
            raw: None,
        }
    }

    /// Verdict for an indicator found on the local block list.
    pub fn local_match(kind: IndicatorKind, value: &str) -> Self {
        Self {
            provider: "local".to_string(),
            kind,
            value: value.to_string(),
            risk: TiRisk::High,
            summary: "Found in local restriction database".to_string(),
            raw: None,
        }
    }
}
