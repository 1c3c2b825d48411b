//! Threat-intelligence lookup service
//!
//! Fronts the provider shims with a shared verdict cache and the
//! provider-specific rate limits the free API tiers impose. Feed snapshots
//! share a single cache with per-entry TTLs.

use crate::providers::{AbuseIpDbClient, OtxClient, VirusTotalClient};
use crate::TiVerdict;
use rampart_core::{IndicatorKind, IntelError};
use rampart_store::{SlidingWindowLimiter, TtlCache};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Indicator verdicts stay fresh for 30 minutes.
pub const INDICATOR_CACHE_TTL: Duration = Duration::from_secs(1800);

/// AbuseIPDB allows ~5 blacklist pulls per day; snapshot for 12 hours.
pub const FEED_TTL_ABUSEIPDB: Duration = Duration::from_secs(43_200);

/// OTX pulse snapshots stay fresh for 1 hour.
pub const FEED_TTL_OTX: Duration = Duration::from_secs(3600);

// Free-tier quotas.
const VT_LIMIT: usize = 4;
const VT_WINDOW: Duration = Duration::from_secs(60);
const ABUSE_LIMIT: usize = 1000;
const ABUSE_WINDOW: Duration = Duration::from_secs(86_400);

/// Which TI provider a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TiProvider {
    VirusTotal,
    Otx,
    AbuseIpDb,
}

impl TiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TiProvider::VirusTotal => "virustotal",
            TiProvider::Otx => "otx",
            TiProvider::AbuseIpDb => "abuseipdb",
        }
    }
}

/// Snapshot of a provider feed, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub provider: String,
    pub data: Value,
}

/// Provider API keys, loaded from the environment.
#[derive(Debug, Clone, Default)]
pub struct IntelConfig {
    pub vt_api_key: Option<String>,
    pub otx_api_key: Option<String>,
    pub abuseipdb_api_key: Option<String>,
}

impl IntelConfig {
    pub fn from_env() -> Self {
        Self {
            vt_api_key: std::env::var("RAMPART_VT_API_KEY").ok(),
            otx_api_key: std::env::var("RAMPART_OTX_API_KEY").ok(),
            abuseipdb_api_key: std::env::var("RAMPART_ABUSEIPDB_API_KEY").ok(),
        }
    }
}

/// TI lookups with caching and per-provider quotas.
pub struct IntelService {
    vt: Option<VirusTotalClient>,
    otx: Option<OtxClient>,
    abuse: Option<AbuseIpDbClient>,
    cache: TtlCache<(TiProvider, IndicatorKind, String), TiVerdict>,
    feed_cache: TtlCache<TiProvider, FeedSnapshot>,
    vt_limiter: SlidingWindowLimiter,
    abuse_limiter: SlidingWindowLimiter,
}

impl IntelService {
    pub fn new(config: IntelConfig) -> Self {
        Self::from_clients(
            config.vt_api_key.map(VirusTotalClient::new),
            config.otx_api_key.map(OtxClient::new),
            config.abuseipdb_api_key.map(AbuseIpDbClient::new),
        )
    }

    /// Assemble from pre-built clients; tests use this to point the shims
    /// at a mock server.
    pub fn from_clients(
        vt: Option<VirusTotalClient>,
        otx: Option<OtxClient>,
        abuse: Option<AbuseIpDbClient>,
    ) -> Self {
        Self {
            vt,
            otx,
            abuse,
            cache: TtlCache::new(INDICATOR_CACHE_TTL),
            feed_cache: TtlCache::new(FEED_TTL_OTX),
            vt_limiter: SlidingWindowLimiter::new(VT_LIMIT, VT_WINDOW),
            abuse_limiter: SlidingWindowLimiter::new(ABUSE_LIMIT, ABUSE_WINDOW),
        }
    }

    /// Look an indicator up with one provider: cache, then quota, then the
    /// provider itself. Not-found verdicts are cached too, saving quota.
    pub async fn lookup(
        &self,
        provider: TiProvider,
        kind: IndicatorKind,
        value: &str,
    ) -> Result<TiVerdict, IntelError> {
        let key = (provider, kind, value.to_string());
        if let Some(verdict) = self.cache.get(&key) {
            return Ok(verdict);
        }

        let verdict = match provider {
            TiProvider::VirusTotal => {
                let client = self
                    .vt
                    .as_ref()
                    .ok_or_else(|| IntelError::MissingApiKey("virustotal".into()))?;
                self.check_quota(provider, &self.vt_limiter)?;
                client.lookup(kind, value).await?
            }
            TiProvider::Otx => {
                let client = self
                    .otx
                    .as_ref()
                    .ok_or_else(|| IntelError::MissingApiKey("otx".into()))?;
                client.lookup(kind, value).await?
            }
            TiProvider::AbuseIpDb => {
                let client = self
                    .abuse
                    .as_ref()
                    .ok_or_else(|| IntelError::MissingApiKey("abuseipdb".into()))?;
                self.check_quota(provider, &self.abuse_limiter)?;
                client.lookup(kind, value).await?
            }
        };

        self.cache.insert(key, verdict.clone());
        Ok(verdict)
    }

    /// AbuseIPDB blacklist snapshot, cached for 12 hours.
    pub async fn feed_abuseipdb(&self) -> Result<FeedSnapshot, IntelError> {
        if let Some(snapshot) = self.feed_cache.get(&TiProvider::AbuseIpDb) {
            return Ok(snapshot);
        }
        let client = self
            .abuse
            .as_ref()
            .ok_or_else(|| IntelError::MissingApiKey("abuseipdb".into()))?;

        let entries = client.feed().await?;
        let snapshot = FeedSnapshot {
            provider: "abuseipdb".to_string(),
            data: serde_json::to_value(entries).unwrap_or(Value::Null),
        };
        self.feed_cache
            .insert_with_ttl(TiProvider::AbuseIpDb, snapshot.clone(), FEED_TTL_ABUSEIPDB);
        Ok(snapshot)
    }

    /// OTX subscribed-pulses snapshot, cached for 1 hour.
    pub async fn feed_otx(&self) -> Result<FeedSnapshot, IntelError> {
        if let Some(snapshot) = self.feed_cache.get(&TiProvider::Otx) {
            return Ok(snapshot);
        }
        let client = self
            .otx
            .as_ref()
            .ok_or_else(|| IntelError::MissingApiKey("otx".into()))?;

        let pulses = client.feed().await?;
        let snapshot = FeedSnapshot {
            provider: "otx".to_string(),
            data: serde_json::to_value(pulses).unwrap_or(Value::Null),
        };
        self.feed_cache
            .insert_with_ttl(TiProvider::Otx, snapshot.clone(), FEED_TTL_OTX);
        Ok(snapshot)
    }

    fn check_quota(
        &self,
        provider: TiProvider,
        limiter: &SlidingWindowLimiter,
    ) -> Result<(), IntelError> {
        let decision = limiter.allow();
        if decision.is_allowed() {
            Ok(())
        } else {
            tracing::warn!(provider = provider.as_str(), "TI quota exhausted");
            Err(IntelError::RateLimited {
                provider: provider.as_str().to_string(),
                retry_after_secs: decision.retry_after_secs(),
            })
        }
    }
}

impl std::fmt::Debug for IntelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntelService")
            .field("virustotal", &self.vt.is_some())
            .field("otx", &self.otx.is_some())
            .field("abuseipdb", &self.abuse.is_some())
            .finish()
    }
}
