//! Authentication module for the ERP SDK
//!
//! This module provides:
//! - Persistent and in-memory session storage
//! - The token store holding the access/refresh pair
//! - An observable "logged in" signal
//! - Coordinated token refresh through a single-flight slot

pub mod manager;
pub mod refresh;
pub mod session;
pub mod single_flight;
pub mod storage;
pub mod token_store;
pub mod types;

// Re-export commonly used types and functions
pub use manager::SessionManager;
pub use refresh::{HttpTokenRefresher, TokenRefresher, DEFAULT_REFRESH_PATH};
pub use session::SessionSignal;
pub use single_flight::SingleFlight;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use types::{AuthError, AuthResult, LoginRequest, RefreshError, TokenPair};
