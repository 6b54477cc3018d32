//! Session lifecycle: login, logout and coordinated token refresh
//!
//! The SessionManager owns the token store, the session signal and the
//! single refresh slot. Clients share one manager through an `Arc`; two
//! managers never interfere with each other.

use super::refresh::TokenRefresher;
use super::session::SessionSignal;
use super::single_flight::SingleFlight;
use super::token_store::TokenStore;
use super::types::{AuthResult, RefreshError, TokenPair};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns the session state of one logged-in user
pub struct SessionManager {
    store: TokenStore,
    signal: SessionSignal,
    refresher: Arc<dyn TokenRefresher>,
    in_flight: SingleFlight<TokenPair, RefreshError>,
}

impl SessionManager {
    /// Create a manager. The session starts logged out until [`Self::login`]
    /// or [`Self::restore`] says otherwise.
    pub fn new(store: TokenStore, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            signal: SessionSignal::default(),
            refresher,
            in_flight: SingleFlight::new(),
        }
    }

    /// Sync the session signal with what the store holds.
    ///
    /// Returns whether a token pair was found.
    pub async fn restore(&self) -> AuthResult<bool> {
        let has_tokens = self.store.get().await?.is_some();
        self.signal.set_logged_in(has_tokens);
        debug!(has_tokens, "Restored session from {}", self.store.location());
        Ok(has_tokens)
    }

    /// Persist a freshly issued pair and mark the session logged in
    pub async fn login(&self, tokens: TokenPair) -> AuthResult<()> {
        self.store.set(&tokens).await?;
        self.signal.set_logged_in(true);
        info!("Logged in");
        Ok(())
    }

    /// Drop all session data and mark the session logged out
    pub async fn logout(&self) -> AuthResult<()> {
        let result = self.store.clear().await;
        self.signal.set_logged_in(false);
        info!("Logged out");
        result
    }

    /// Access token to present on the next request, if any
    pub async fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(self.store.get().await?.map(|pair| pair.access_token))
    }

    /// Refresh the token pair, joining a refresh already in progress.
    ///
    /// Persisting the new pair, or clearing the session on failure, happens
    /// once inside the shared computation, so every waiter observes the
    /// final store and signal state when it resumes.
    pub async fn refresh(&self) -> Result<TokenPair, RefreshError> {
        self.in_flight
            .run(|| {
                let store = self.store.clone();
                let signal = self.signal.clone();
                let refresher = Arc::clone(&self.refresher);
                async move {
                    match Self::refresh_tokens(&store, refresher.as_ref()).await {
                        Ok(tokens) => {
                            signal.set_logged_in(true);
                            Ok(tokens)
                        }
                        Err(e) => {
                            warn!("Token refresh via {} failed: {}", refresher.name(), e);
                            if let Err(clear_err) = store.clear().await {
                                warn!("Failed to clear session storage: {}", clear_err);
                            }
                            signal.set_logged_in(false);
                            Err(e)
                        }
                    }
                }
            })
            .await
    }

    async fn refresh_tokens(
        store: &TokenStore,
        refresher: &dyn TokenRefresher,
    ) -> Result<TokenPair, RefreshError> {
        let current = store
            .get()
            .await
            .map_err(|e| RefreshError::Storage(e.to_string()))?
            .ok_or(RefreshError::MissingRefreshToken)?;

        let tokens = refresher.refresh(&current.refresh_token).await?;

        store
            .set(&tokens)
            .await
            .map_err(|e| RefreshError::Storage(e.to_string()))?;

        Ok(tokens)
    }

    /// Whether a refresh is currently pending
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_in_flight()
    }

    pub fn is_logged_in(&self) -> bool {
        self.signal.is_logged_in()
    }

    pub fn signal(&self) -> &SessionSignal {
        &self.signal
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("logged_in", &self.signal.is_logged_in())
            .field("refresher", &self.refresher.name())
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Refresher that blocks until released and counts its calls
    struct GatedRefresher {
        calls: AtomicUsize,
        gate: Notify,
        outcome: Result<TokenPair, RefreshError>,
    }

    impl GatedRefresher {
        fn new(outcome: Result<TokenPair, RefreshError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                outcome,
            })
        }
    }

    #[async_trait]
    impl TokenRefresher for GatedRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
            assert_eq!(refresh_token, "r1");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.outcome.clone()
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    async fn logged_in_manager(refresher: Arc<GatedRefresher>) -> Arc<SessionManager> {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        let manager = Arc::new(SessionManager::new(store, refresher));
        manager.login(TokenPair::new("a1", "r1")).await.unwrap();
        manager
    }

    async fn spawn_refreshes(
        manager: &Arc<SessionManager>,
        refresher: &Arc<GatedRefresher>,
        count: usize,
    ) -> Vec<Result<TokenPair, RefreshError>> {
        let handles: Vec<_> = (0..count)
            .map(|_| {
                let manager = Arc::clone(manager);
                tokio::spawn(async move { manager.refresh().await })
            })
            .collect();

        while refresher.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(manager.is_refreshing());
        refresher.gate.notify_one();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let refresher = GatedRefresher::new(Err(RefreshError::MissingRefreshToken));
        let manager = logged_in_manager(refresher).await;

        assert!(manager.is_logged_in());
        assert_eq!(manager.access_token().await.unwrap().as_deref(), Some("a1"));

        manager.logout().await.unwrap();
        assert!(!manager.is_logged_in());
        assert!(manager.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_reflects_store() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(storage);
        store.set(&TokenPair::new("a1", "r1")).await.unwrap();

        let manager = SessionManager::new(
            store,
            GatedRefresher::new(Err(RefreshError::MissingRefreshToken)),
        );
        assert!(!manager.is_logged_in());
        assert!(manager.restore().await.unwrap());
        assert!(manager.is_logged_in());
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_call_endpoint_once() {
        let refresher = GatedRefresher::new(Ok(TokenPair::new("a2", "r2")));
        let manager = logged_in_manager(Arc::clone(&refresher)).await;

        let results = spawn_refreshes(&manager, &refresher, 4).await;

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap(), TokenPair::new("a2", "r2"));
        }
        assert!(!manager.is_refreshing());
        assert_eq!(
            manager.store().get().await.unwrap(),
            Some(TokenPair::new("a2", "r2"))
        );
        assert!(manager.is_logged_in());
    }

    #[tokio::test]
    async fn test_failed_refresh_ends_session_for_all_waiters() {
        let failure = RefreshError::Rejected {
            status: 401,
            body: "expired".into(),
        };
        let refresher = GatedRefresher::new(Err(failure.clone()));
        let manager = logged_in_manager(Arc::clone(&refresher)).await;

        let results = spawn_refreshes(&manager, &refresher, 3).await;

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap_err(), failure);
        }
        assert!(!manager.is_refreshing());
        assert!(manager.store().get().await.unwrap().is_none());
        assert!(!manager.is_logged_in());
    }

    #[tokio::test]
    async fn test_refresh_without_tokens_fails_fast() {
        let refresher = GatedRefresher::new(Ok(TokenPair::new("a2", "r2")));
        let store = TokenStore::new(Arc::new(MemoryStorage::new()));
        let manager = SessionManager::new(store, refresher.clone());

        let err = manager.refresh().await.unwrap_err();
        assert_eq!(err, RefreshError::MissingRefreshToken);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
        assert!(!manager.is_refreshing());
    }

    #[tokio::test]
    async fn test_independent_managers_do_not_share_state() {
        let first_refresher = GatedRefresher::new(Ok(TokenPair::new("a2", "r2")));
        let first = logged_in_manager(first_refresher).await;
        let second_refresher = GatedRefresher::new(Ok(TokenPair::new("b2", "s2")));
        let second = logged_in_manager(second_refresher).await;

        first.logout().await.unwrap();
        assert!(!first.is_logged_in());
        assert!(second.is_logged_in());
        assert_eq!(second.access_token().await.unwrap().as_deref(), Some("a1"));
    }
}
