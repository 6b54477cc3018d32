//! Authentication-related types and data structures
//!
//! This module defines the token pair exchanged with the backend and the
//! error types used throughout the auth module.

use etcetera::{choose_base_strategy, BaseStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Access/refresh token pair as issued by the backend
///
/// Tokens are opaque strings; nothing here parses or validates them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Longer-lived credential exchanged for a new pair
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new token pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Keep credentials out of logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Credentials posted to the login endpoint
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a failed token refresh
///
/// Cloned to every request waiting on the same refresh, so it only carries
/// owned strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    /// No refresh token was stored when the refresh started
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status
    #[error("Token refresh rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The refresh endpoint could not be reached
    #[error("Token refresh request failed: {0}")]
    Network(String),

    /// The refresh endpoint answered with an unexpected body
    #[error("Invalid token refresh response: {0}")]
    InvalidResponse(String),

    /// Reading or persisting tokens failed
    #[error("Token storage error during refresh: {0}")]
    Storage(String),
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token storage error
    #[error("Token storage error: {0}")]
    StorageError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Get the default data directory for session storage
/// Returns platform-specific data directory (e.g., ~/.local/share/erp-console on Linux)
pub fn get_sdk_data_dir() -> AuthResult<PathBuf> {
    let strategy = choose_base_strategy().map_err(|e| {
        AuthError::ConfigError(format!("Failed to determine base directories: {}", e))
    })?;

    Ok(strategy.data_dir().join("erp-console"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_wire_format() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"accessToken":"a1","refreshToken":"r1"}"#).unwrap();
        assert_eq!(pair, TokenPair::new("a1", "r1"));

        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "a1");
        assert_eq!(json["refreshToken"], "r1");
    }

    #[test]
    fn test_token_pair_requires_both_tokens() {
        let result = serde_json::from_str::<TokenPair>(r#"{"accessToken":"a1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains("secret"));

        let login = LoginRequest {
            email: "ops@example.com".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{:?}", login);
        assert!(rendered.contains("ops@example.com"));
        assert!(!rendered.contains("hunter2"));
    }
}
