//! Session tokens, password hashing, and the auth extractor
//!
//! Sessions are opaque 256-bit random tokens minted on login and held in a
//! process-local map (token -> context); they do not survive a restart.
//! Mutating handlers declare [`AuthExtractor`]; admin-scoped handlers call
//! [`AuthContext::require_admin`] on the extracted context.

use crate::error::{ApiError, ApiResult};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use rampart_core::Role;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ============================================================================
// AUTH CONTEXT
// ============================================================================

/// Identity attached to a request after token validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Admin-scoped operations call this before touching state.
    pub fn require_admin(&self) -> ApiResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }
}

// ============================================================================
// TOKEN SET
// ============================================================================

/// Process-local set of valid bearer tokens. Cleared on restart.
#[derive(Debug, Default)]
pub struct TokenSet {
    tokens: Mutex<HashMap<String, AuthContext>>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh 256-bit token for the given identity.
    pub fn mint(&self, context: AuthContext) -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(token.clone(), context);
        }
        token
    }

    /// Register a pre-shared token (the pipeline's ingest token).
    pub fn insert(&self, token: impl Into<String>, context: AuthContext) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.insert(token.into(), context);
        }
    }

    pub fn context_for(&self, token: &str) -> Option<AuthContext> {
        self.tokens.lock().ok()?.get(token).cloned()
    }

    pub fn revoke(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.lock() {
            tokens.remove(token);
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a password into a salted PHC string.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal_error(format!("Password hashing failed: {}", e)))
}

/// Constant-time verification against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Extractor validating the bearer token against the process-local token
/// set. Declaring it on a handler makes the route token-protected: missing
/// or unknown tokens reject with 401 before the handler body runs, so no
/// state can change.
pub struct AuthExtractor(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthExtractor
where
    S: Send + Sync,
    Arc<TokenSet>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenSet>::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        tokens
            .context_for(token)
            .map(AuthExtractor)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))
    }
}
