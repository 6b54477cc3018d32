//! Token pair persistence on top of [`KeyValueStorage`]

use super::storage::KeyValueStorage;
use super::types::{AuthResult, TokenPair};
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Reads and writes the token pair as a unit
///
/// A storage holding only one of the two keys reads as empty; a pair is
/// never exposed half-written.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Current token pair, if both tokens are stored
    pub async fn get(&self) -> AuthResult<Option<TokenPair>> {
        let access_token = self.storage.get_item(ACCESS_TOKEN_KEY).await?;
        let refresh_token = self.storage.get_item(REFRESH_TOKEN_KEY).await?;

        match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token)) => Ok(Some(TokenPair {
                access_token,
                refresh_token,
            })),
            (None, None) => Ok(None),
            _ => {
                warn!("Session storage holds an incomplete token pair, ignoring it");
                Ok(None)
            }
        }
    }

    /// Persist both tokens in one storage write. If the pair cannot be
    /// written completely the storage is cleared and the write error returned.
    pub async fn set(&self, pair: &TokenPair) -> AuthResult<()> {
        let result = self
            .storage
            .set_items(&[
                (ACCESS_TOKEN_KEY, pair.access_token.as_str()),
                (REFRESH_TOKEN_KEY, pair.refresh_token.as_str()),
            ])
            .await;

        if let Err(e) = result {
            warn!("Failed to persist token pair: {}", e);
            if let Err(clear_err) = self.storage.clear().await {
                warn!("Failed to clear session storage: {}", clear_err);
            }
            return Err(e);
        }

        debug!("Stored token pair in {}", self.storage.describe());
        Ok(())
    }

    /// Remove both tokens and any other session-scoped keys
    pub async fn clear(&self) -> AuthResult<()> {
        self.storage.clear().await?;
        debug!("Cleared session storage {}", self.storage.describe());
        Ok(())
    }

    /// Location of the underlying storage
    pub fn location(&self) -> String {
        self.storage.describe()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("storage", &self.storage.describe())
            .finish()
    }
}
