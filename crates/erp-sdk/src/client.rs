//! HTTP client for the ERP backend
//!
//! This module provides a type-safe client for the ERP REST API.
//!
//! # Authentication
//!
//! - Every request carries `Authorization: Bearer {access_token}` when the
//!   session holds a token pair.
//! - A `401 Unauthorized` response triggers one token refresh, shared by all
//!   requests failing at the same time, followed by a single retry of each
//!   original request with the new token.
//! - A failed refresh ends the session; the caller receives the original
//!   401 error.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use erp_sdk::ClientBuilder;
//!
//! # async fn example() -> erp_sdk::Result<()> {
//! let client = ClientBuilder::default()
//!     .base_url("https://erp.example.com")
//!     .with_file_storage()?
//!     .build()?;
//!
//! client.session().restore().await?;
//! if !client.session().is_logged_in() {
//!     client.login("ops@example.com", "secret").await?;
//! }
//!
//! let orders: serde_json::Value = client.get("/api/orders").await?;
//! # Ok(())
//! # }
//! ```

use crate::{
    auth::{
        FileStorage, HttpTokenRefresher, KeyValueStorage, LoginRequest, SessionManager,
        TokenPair, TokenStore, DEFAULT_REFRESH_PATH,
    },
    error::{ApiError, Result},
};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API URL when not specified
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default path of the login endpoint
pub const DEFAULT_LOGIN_PATH: &str = "/api/user/login";

/// Default timeout in seconds for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP client for interacting with the ERP API
#[derive(Debug, Clone)]
pub struct ErpClient {
    http_client: reqwest::Client,
    base_url: String,
    login_path: String,
    session: Arc<SessionManager>,
}

impl ErpClient {
    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session shared by every clone of this client
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    // ===== Session =====

    /// Exchange credentials for a token pair and start a session
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http_client
            .post(self.url(&self.login_path))
            .json(&credentials)
            .send()
            .await?;

        let tokens: TokenPair = Self::handle_response(response).await?;
        self.session.login(tokens).await?;
        Ok(())
    }

    /// End the session and drop all stored tokens
    pub async fn logout(&self) -> Result<()> {
        self.session.logout().await?;
        Ok(())
    }

    // ===== Typed verbs =====

    /// Generic GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None::<&()>, None::<&()>)
            .await
    }

    /// GET request with query parameters
    pub async fn get_with_query<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        self.request(Method::GET, path, Some(query), None::<&()>)
            .await
    }

    /// Generic POST request
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, None::<&()>, Some(body))
            .await
    }

    /// Generic PUT request
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PUT, path, None::<&()>, Some(body))
            .await
    }

    /// Generic PATCH request
    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::PATCH, path, None::<&()>, Some(body))
            .await
    }

    /// Generic DELETE request; any success status is accepted
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.http_client.delete(self.url(path));
        let response = self.send(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    // ===== Authenticated execution =====

    /// Execute a request with authentication and 401 recovery.
    ///
    /// Only transport failures are returned as errors; HTTP error statuses
    /// come back as the response (after recovery, for 401).
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut request = request.build()?;
        let replay = request.try_clone();

        self.authenticate(&mut request).await;
        let response = self.http_client.execute(request).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(mut replay) = replay else {
            debug!("Request body cannot be replayed, skipping token refresh");
            return Ok(response);
        };

        // Consume the original body now; it is what the caller sees if
        // recovery fails.
        let original = ApiError::from_response(response).await;
        debug!(
            "{} {} returned 401, refreshing session",
            replay.method(),
            replay.url().path()
        );

        match self.session.refresh().await {
            Ok(tokens) => {
                Self::set_bearer(&mut replay, &tokens.access_token);
                debug!("Retrying {} {}", replay.method(), replay.url().path());
                Ok(self.http_client.execute(replay).await?)
            }
            Err(e) => {
                warn!("Session ended after failed token refresh: {}", e);
                Err(original)
            }
        }
    }

    // ===== Private Helper Methods =====

    async fn request<Q, B, T>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http_client.request(method, self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.send(request).await?;
        Self::handle_response(response).await
    }

    /// Attach the current access token, if there is one. Never fails: an
    /// unreadable store or an unusable token leaves the request anonymous.
    async fn authenticate(&self, request: &mut Request) {
        match self.session.access_token().await {
            Ok(Some(token)) => Self::set_bearer(request, &token),
            Ok(None) => {
                request.headers_mut().remove(AUTHORIZATION);
            }
            Err(e) => {
                warn!("Could not read access token, sending request unauthenticated: {}", e);
                request.headers_mut().remove(AUTHORIZATION);
            }
        }
    }

    fn set_bearer(request: &mut Request, token: &str) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => {
                warn!("Access token is not a valid header value, sending request unauthenticated");
                request.headers_mut().remove(AUTHORIZATION);
            }
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Decode a success body or the error it carries
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let bytes = response.bytes().await?;
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })
    }
}

/// Builder for constructing an ErpClient with custom configuration
#[derive(Default)]
pub struct ClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_max_idle_per_host: Option<usize>,
    refresh_path: Option<String>,
    login_path: Option<String>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    session: Option<Arc<SessionManager>>,
}

impl ClientBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL for the API
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = Some(max);
        self
    }

    /// Override the token refresh endpoint path
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Override the login endpoint path
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Keep session data in the given storage backend
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Keep session data in `session.json` under the platform data directory
    pub fn with_file_storage(self) -> Result<Self> {
        let storage = FileStorage::default_location()?;
        Ok(self.with_storage(Arc::new(storage)))
    }

    /// Keep session data in `session.json` under `dir`
    pub fn with_storage_dir(self, dir: impl Into<PathBuf>) -> Self {
        self.with_storage(Arc::new(FileStorage::in_dir(dir.into())))
    }

    /// Share an existing session instead of creating one.
    /// Refresh and login paths then come from that session.
    pub fn with_session(mut self, session: Arc<SessionManager>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ErpClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        url::Url::parse(&base_url).map_err(|e| ApiError::InvalidRequest {
            message: format!("Invalid base URL '{}': {}", base_url, e),
        })?;

        let mut http_builder = reqwest::Client::builder().timeout(
            self.timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        );
        if let Some(connect_timeout) = self.connect_timeout {
            http_builder = http_builder.connect_timeout(connect_timeout);
        }
        if let Some(max) = self.pool_max_idle_per_host {
            http_builder = http_builder.pool_max_idle_per_host(max);
        }
        let http_client = http_builder.build()?;

        let session = match (self.session, self.storage) {
            (Some(session), _) => session,
            (None, Some(storage)) => {
                let refresher = HttpTokenRefresher::new(
                    http_client.clone(),
                    &base_url,
                    self.refresh_path.as_deref().unwrap_or(DEFAULT_REFRESH_PATH),
                );
                Arc::new(SessionManager::new(
                    TokenStore::new(storage),
                    Arc::new(refresher),
                ))
            }
            (None, None) => {
                return Err(ApiError::InvalidRequest {
                    message: "A session store is required: use with_storage(), with_file_storage(), with_storage_dir() or with_session()"
                        .into(),
                });
            }
        };

        Ok(ErpClient {
            http_client,
            base_url,
            login_path: self
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            session,
        })
    }
}
