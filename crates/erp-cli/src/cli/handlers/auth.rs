//! Authentication command handlers

use crate::client::create_client;
use crate::config::ConsoleConfig;
use crate::error::{CliError, Result};
use crate::output::{compress_path, json_output, print_field, print_info, print_success};
use dialoguer::{Input, Password};
use serde::Serialize;
use tracing::debug;

/// Session state as reported by `erp status`
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub logged_in: bool,
    pub api_url: String,
    pub session_file: String,
}

/// Handle login command
pub async fn handle_login(email: Option<String>, config: &ConsoleConfig) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| CliError::internal(format!("Failed to read email: {e}")))?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| CliError::internal(format!("Failed to read password: {e}")))?;

    login_with_credentials(&email, &password, config).await?;

    print_success(&format!("Logged in to {} as {}", config.api.base_url, email));
    Ok(())
}

/// Exchange credentials for a session without prompting
pub async fn login_with_credentials(
    email: &str,
    password: &str,
    config: &ConsoleConfig,
) -> Result<()> {
    debug!("Logging in as {}", email);
    let client = create_client(config).await?;
    client.login(email, password).await?;
    Ok(())
}

/// Handle logout command
pub async fn handle_logout(config: &ConsoleConfig) -> Result<()> {
    let client = create_client(config).await?;
    let was_logged_in = client.session().is_logged_in();
    client.logout().await?;

    if was_logged_in {
        print_success("Logged out");
    } else {
        print_info("No active session");
    }
    Ok(())
}

/// Handle status command
pub async fn handle_status(config: &ConsoleConfig, json: bool) -> Result<()> {
    let client = create_client(config).await?;
    let status = SessionStatus {
        logged_in: client.session().is_logged_in(),
        api_url: client.base_url().to_string(),
        session_file: compress_path(&config.session_dir()?.join(erp_sdk::FileStorage::FILE_NAME)),
    };

    if json {
        return json_output(&status);
    }

    if status.logged_in {
        print_success(&format!("Logged in to {}", status.api_url));
    } else {
        print_info(&format!("Not logged in to {}", status.api_url));
    }
    print_field("Session file", &status.session_file);
    Ok(())
}
