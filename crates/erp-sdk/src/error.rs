//! Error types for the ERP SDK
//!
//! Every non-success HTTP response is decoded exactly once, in
//! [`ApiError::from_response`], into one of a closed set of variants.
//! Callers match on the variant instead of inspecting response bodies.

use crate::auth::AuthError;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by [`crate::ErpClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload rejected (400, 422)
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// Missing, expired or invalid credentials (401)
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Authenticated but not allowed (403)
    #[error("Authorization error: {message}")]
    Authorization { message: String },

    /// Not found (404)
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Conflicting state on the server (409)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Any other 4xx
    #[error("Request failed with status {status}: {message}")]
    Client { status: u16, message: String },

    /// 5xx
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Transport failure (connect, timeout, TLS, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Success response with a body that does not match the expected type
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    /// The request could not be built on the client side
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Session storage or login bookkeeping failed
    #[error(transparent)]
    Session(#[from] AuthError),
}

/// Error body sent by the backend. Every member is optional; the server is
/// not consistent about which one carries the message.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub error: Option<String>,

    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    fn into_message(self, fallback: &str) -> (String, BTreeMap<String, Vec<String>>) {
        let fields = self.errors.unwrap_or_default();
        let message = self
            .message
            .or(self.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        (message, fields)
    }
}

impl ApiError {
    /// Decode a non-success response
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let url_path = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        Self::from_parts(status, &url_path, &body)
    }

    /// Decode from status, request path and raw body
    pub fn from_parts(status: StatusCode, path: &str, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let fallback = if parsed.is_none() && !body.trim().is_empty() {
            body.trim().to_string()
        } else {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        };
        let (message, fields) = parsed.unwrap_or_default().into_message(&fallback);

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::Validation { message, fields }
            }
            StatusCode::UNAUTHORIZED => ApiError::Authentication { message },
            StatusCode::FORBIDDEN => ApiError::Authorization { message },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: path.to_string(),
            },
            StatusCode::CONFLICT => ApiError::Conflict { message },
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimitExceeded,
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::Client {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Get error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "ERP_VALIDATION",
            ApiError::Authentication { .. } => "ERP_AUTH",
            ApiError::Authorization { .. } => "ERP_AUTHZ",
            ApiError::NotFound { .. } => "ERP_NOT_FOUND",
            ApiError::Conflict { .. } => "ERP_CONFLICT",
            ApiError::RateLimitExceeded => "ERP_RATE_LIMIT",
            ApiError::Client { .. } => "ERP_CLIENT_ERROR",
            ApiError::Server { .. } => "ERP_SERVER_ERROR",
            ApiError::Network(_) => "ERP_NETWORK",
            ApiError::Decode { .. } => "ERP_DECODE",
            ApiError::InvalidRequest { .. } => "ERP_INVALID_REQUEST",
            ApiError::Session(_) => "ERP_SESSION",
        }
    }

    /// HTTP status the error was decoded from, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication { .. } => Some(401),
            ApiError::Authorization { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::RateLimitExceeded => Some(429),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::RateLimitExceeded | ApiError::Server { .. }
        )
    }

    /// Check if error is a client error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::Validation { .. }
                | ApiError::Authentication { .. }
                | ApiError::Authorization { .. }
                | ApiError::NotFound { .. }
                | ApiError::Conflict { .. }
                | ApiError::RateLimitExceeded
                | ApiError::Client { .. }
        )
    }
}
