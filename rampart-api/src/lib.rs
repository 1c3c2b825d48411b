//! Rampart API - Management Control Plane
//!
//! The unified server for the WAF: the control plane lives under `/api`
//! (auth, rules, settings, log ingest, analytics, entity CRUD, threat
//! intel, attack analysis, training stub) and every other request falls
//! through to the inline detection pipeline in `rampart-proxy`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod macros;
pub mod render;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod training;
pub mod types;

// Re-export commonly used types
pub use auth::{hash_password, verify_password, AuthContext, AuthExtractor, TokenSet};
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
pub use telemetry::init_tracing;
pub use training::TrainingState;
pub use types::*;
