//! Provider shims
//!
//! One client per third-party TI API. Each normalizes the provider's
//! response into a [`TiVerdict`](crate::TiVerdict) with the provider's
//! documented risk heuristics and maps HTTP 404 to a cacheable
//! `risk = unknown` result.

mod abuseipdb;
mod otx;
mod virustotal;

pub use abuseipdb::AbuseIpDbClient;
pub use otx::OtxClient;
pub use virustotal::VirusTotalClient;

use rampart_core::IntelError;
use std::time::Duration;

/// Timeout for individual indicator lookups.
pub(crate) const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for feed snapshot pulls, which return larger bodies.
pub(crate) const FEED_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> IntelError {
    IntelError::Upstream {
        provider: provider.to_string(),
        message: e.to_string(),
    }
}

pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode) -> IntelError {
    IntelError::Upstream {
        provider: provider.to_string(),
        message: format!("status {}", status),
    }
}
