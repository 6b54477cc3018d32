//! Error types for the ERP CLI

use color_eyre::eyre::{eyre, Report};
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file issues
    #[error("Configuration error: {0}")]
    Config(#[from] erp_common::ConfigurationError),

    /// API communication errors
    #[error("API error: {0}")]
    Api(#[from] erp_sdk::ApiError),

    /// Session storage issues
    #[error(transparent)]
    Auth(#[from] erp_sdk::AuthError),

    /// No session is stored
    #[error("Not logged in. Run 'erp login' to authenticate")]
    NotLoggedIn,

    /// The session could not be renewed during a command
    #[error("Session expired. Run 'erp login' to authenticate again")]
    SessionExpired,

    /// Bad command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Filesystem errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Everything else (using color-eyre's Report for rich errors)
    #[error(transparent)]
    Internal(#[from] Report),
}

impl CliError {
    pub fn internal(message: impl std::fmt::Display) -> Self {
        CliError::Internal(eyre!("{}", message))
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CliError::InvalidArgument(message.into())
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
