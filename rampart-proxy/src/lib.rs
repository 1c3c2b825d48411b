//! Rampart Proxy - Inline Detection Pipeline
//!
//! The hot path of the WAF: capture the request, scan it against the
//! signature set, score it with the external ML service (cached, fail-open),
//! classify the score into a verdict band, then either deny with a 403 or
//! relay the request to the protected upstream. Every inspected request is
//! journaled.

mod ml;
mod pipeline;
mod relay;
mod signatures;
mod state;

pub use ml::{MlClient, MlRequest};
pub use pipeline::{handle_request, inspect, PipelineDecision};
pub use relay::forward_upstream;
pub use signatures::{RuleSet, RuleView, SignatureDef};
pub use state::ProxyState;
