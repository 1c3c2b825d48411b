//! Error types for the control-plane API
//!
//! Every failure surfaces as a structured JSON body with a stable error
//! code; the code maps to exactly one HTTP status. Rate-limit denials carry
//! `retry_after` in the details so callers can back off.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rampart_core::{ConfigError, IntelError, JournalError, LlmError, SignatureError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Request is authenticated but the role does not permit the operation
    Forbidden,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field or parameter is missing
    MissingField,

    /// Update would break a configuration invariant
    ValidationFailed,

    /// Requested entity does not exist
    NotFound,

    /// Duplicate key or conflicting state
    Conflict,

    /// Provider or analysis quota exhausted
    RateLimited,

    /// TI provider, LLM, or protected upstream failed
    UpstreamError,

    /// Database operation failed
    DatabaseError,

    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::InvalidInput | ErrorCode::MissingField | ErrorCode::ValidationFailed => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response returned by every control-plane endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Missing required parameter: {}", field),
        )
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after_secs: u64) -> Self {
        Self::new(ErrorCode::RateLimited, message)
            .with_details(serde_json::json!({ "retry_after": retry_after_secs }))
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

// ============================================================================
// CONVERSIONS FROM MODULE ERRORS
// ============================================================================

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Unique-constraint violations are client conflicts, not 500s.
        if let Some(db_err) = err.as_db_error() {
            if db_err.code() == &tokio_postgres::error::SqlState::UNIQUE_VIOLATION {
                return ApiError::conflict("Duplicate value for a unique field");
            }
        }
        tracing::error!(error = ?err, "database error");
        ApiError::database_error("Database operation failed")
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!(error = ?err, "connection pool error");
        ApiError::database_error("Failed to acquire database connection")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::validation_failed(err.to_string())
    }
}

impl From<SignatureError> for ApiError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::UnknownRule(id) => ApiError::not_found(format!("Unknown rule: {}", id)),
            SignatureError::InvalidRegex { .. } => ApiError::invalid_input(err.to_string()),
            _ => ApiError::internal_error(err.to_string()),
        }
    }
}

impl From<IntelError> for ApiError {
    fn from(err: IntelError) -> Self {
        match err {
            IntelError::MissingApiKey(provider) => ApiError::internal_error(format!(
                "Server configuration error: missing {} API key",
                provider
            )),
            IntelError::InvalidIndicator(reason) => ApiError::invalid_input(reason),
            IntelError::RateLimited {
                provider,
                retry_after_secs,
            } => ApiError::rate_limited(
                format!("{} rate limit exceeded. Please wait.", provider),
                retry_after_secs,
            ),
            IntelError::Upstream { provider, message } => {
                ApiError::upstream(format!("Upstream error from {}: {}", provider, message))
            }
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { retry_after_secs } => ApiError::rate_limited(
                "Rate limit exceeded for analysis generation.",
                retry_after_secs,
            ),
            other => ApiError::upstream(other.to_string()),
        }
    }
}

impl From<JournalError> for ApiError {
    fn from(err: JournalError) -> Self {
        tracing::error!(error = %err, "journal error");
        ApiError::internal_error("Journal operation failed")
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ErrorCode::UpstreamError.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rate_limited_carries_retry_after() {
        let err = ApiError::rate_limited("slow down", 42);
        assert_eq!(err.details.unwrap()["retry_after"], 42);
    }

    #[test]
    fn intel_errors_map_to_expected_codes() {
        let err: ApiError = IntelError::MissingApiKey("virustotal".into()).into();
        assert_eq!(err.code, ErrorCode::InternalError);

        let err: ApiError = IntelError::RateLimited {
            provider: "virustotal".into(),
            retry_after_secs: 12,
        }
        .into();
        assert_eq!(err.code, ErrorCode::RateLimited);

        let err: ApiError = IntelError::Upstream {
            provider: "otx".into(),
            message: "timeout".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::UpstreamError);
    }

    #[test]
    fn unauthorized_response_carries_www_authenticate() {
        let response = ApiError::unauthorized("Invalid or expired token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn message_serializes_as_error_field() {
        let err = ApiError::invalid_input("bad type");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["error"], "bad type");
    }
}
