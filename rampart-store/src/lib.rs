//! Rampart Store - In-Process State & Durability
//!
//! The pieces of shared mutable state the pipeline and control plane lean
//! on: the append-only request journal, the bounded ML score cache, TTL
//! caches for threat-intel and analysis results, and the sliding-window
//! rate limiter.

mod journal;
mod limiter;
mod score_cache;
mod ttl_cache;

pub use journal::Journal;
pub use limiter::{Decision, SlidingWindowLimiter};
pub use score_cache::{ScoreCache, SCORE_CACHE_CAP};
pub use ttl_cache::TtlCache;
