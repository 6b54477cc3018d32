//! # ERP CLI
//!
//! Command-line console for the ERP administration backend.
//!
//! ## Architecture
//!
//! - Clap-based argument parsing with derive macros
//! - Handler-based command processing
//! - Layered configuration (defaults, TOML file, `ERP_*` environment)
//! - Session handling delegated to `erp-sdk`

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;

pub use cli::*;
pub use error::*;
