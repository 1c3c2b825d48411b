//! Tracing initialization

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber. `RUST_LOG` controls the
/// filter; hot-path inspection logs at debug, verdicts at info.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rampart_proxy=info,tower_http=warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
