//! CLI-specific client creation
//!
//! Builds an [`ErpClient`] from the console configuration, backed by the
//! file session under the configured data directory.

use crate::config::ConsoleConfig;
use crate::error::{CliError, Result};
use erp_sdk::{ApiError, ClientBuilder, ErpClient};
use tracing::debug;

/// Creates a client and syncs its session signal with the stored tokens
pub async fn create_client(config: &ConsoleConfig) -> Result<ErpClient> {
    let session_dir = config.session_dir()?;
    debug!(
        "Creating client for {} with session in {}",
        config.api.base_url,
        session_dir.display()
    );

    let client = ClientBuilder::default()
        .base_url(&config.api.base_url)
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .refresh_path(&config.api.refresh_path)
        .login_path(&config.api.login_path)
        .with_storage_dir(session_dir)
        .build()?;

    client.session().restore().await?;
    Ok(client)
}

/// Creates a client that already holds a session
pub async fn create_authenticated_client(config: &ConsoleConfig) -> Result<ErpClient> {
    let client = create_client(config).await?;
    if !client.session().is_logged_in() {
        return Err(CliError::NotLoggedIn);
    }
    Ok(client)
}

/// Map an API error to what the user should see.
///
/// An authentication failure after which the session is gone means the
/// refresh attempt could not renew it.
pub fn session_aware_error(client: &ErpClient, error: ApiError) -> CliError {
    match error {
        ApiError::Authentication { .. } if !client.session().is_logged_in() => {
            CliError::SessionExpired
        }
        other => CliError::Api(other),
    }
}
