//! Error types shared across the workspace

use thiserror::Error;

/// Errors raised while loading or rendering configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration sources could not be merged or extracted
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// A value was present but not acceptable
    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
