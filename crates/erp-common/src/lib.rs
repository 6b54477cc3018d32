//! # ERP Common
//!
//! Shared pieces used by every crate of the ERP console workspace:
//! - unified `tracing` initialization
//! - the layered configuration loader trait
//! - configuration error types

pub mod config;
pub mod error;
pub mod logging;

pub use config::ConfigLoader;
pub use error::ConfigurationError;
