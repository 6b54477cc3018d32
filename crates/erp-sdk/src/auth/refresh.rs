//! Token refresh against the backend
//!
//! The refresh call is deliberately issued on a plain `reqwest::Client`: it
//! must never pass through the 401 recovery path itself.

use super::types::{RefreshError, TokenPair};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

/// Default path of the refresh endpoint
pub const DEFAULT_REFRESH_PATH: &str = "/api/user/refresh";

/// Exchanges a refresh token for a new token pair
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Perform one refresh call
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError>;

    /// Name for logging/debugging
    fn name(&self) -> &str;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresher calling `POST {base_url}{path}` with `{ "refreshToken": ... }`
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpTokenRefresher {
    pub fn new(http_client: reqwest::Client, base_url: &str, path: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        debug!("Refreshing access token via {}", self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;
        let pair: TokenPair = serde_json::from_slice(&body)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        info!("Token refresh completed successfully");
        Ok(pair)
    }

    fn name(&self) -> &str {
        "http"
    }
}
