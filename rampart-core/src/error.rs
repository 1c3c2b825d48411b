//! Error types for Rampart operations

use thiserror::Error;

/// Journal I/O errors.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to open journal at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append journal entry: {0}")]
    Append(#[source] std::io::Error),

    #[error("failed to serialize journal entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("journal lock poisoned")]
    LockPoisoned,
}

/// Signature-rule loading and matching errors.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to read signature file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse signature file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid regex in rule {id}: {reason}")]
    InvalidRegex { id: String, reason: String },

    #[error("unknown rule: {0}")]
    UnknownRule(String),
}

/// LLM provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("no LLM provider configured")]
    ProviderNotConfigured,

    #[error("request to {provider} failed: {message}")]
    RequestFailed { provider: String, message: String },

    #[error("invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("response missing required key: {0}")]
    SchemaIncomplete(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// Threat-intelligence provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntelError {
    #[error("provider {0} is not configured (missing API key)")]
    MissingApiKey(String),

    #[error("invalid indicator: {0}")]
    InvalidIndicator(String),

    #[error("rate limited by {provider}, retry after {retry_after_secs}s")]
    RateLimited {
        provider: String,
        retry_after_secs: u64,
    },

    #[error("upstream error from {provider}: {message}")]
    Upstream { provider: String, message: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Top-level error type unifying all module errors.
#[derive(Debug, Error)]
pub enum RampartError {
    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Intel(#[from] IntelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias used across the workspace.
pub type RampartResult<T> = Result<T, RampartError>;
