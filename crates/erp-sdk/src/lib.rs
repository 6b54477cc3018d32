//! # ERP SDK
//!
//! Client library for the ERP administration backend (orders, purchasing,
//! inventory, customers/suppliers, settings, reporting).
//!
//! The interesting part is the session handling: bearer authentication on
//! every request, one shared token refresh for any number of concurrent
//! `401` responses, and an observable logged-in signal that flips to
//! `false` when the session cannot be renewed.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{
    AuthError, FileStorage, KeyValueStorage, MemoryStorage, SessionManager, SessionSignal,
    TokenPair, TokenStore,
};
pub use client::{ClientBuilder, ErpClient, DEFAULT_API_URL, DEFAULT_LOGIN_PATH};
pub use error::{ApiError, ErrorResponse, Result};
