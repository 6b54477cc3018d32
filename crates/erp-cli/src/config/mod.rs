//! Configuration management for the ERP CLI

use crate::error::{CliError, Result};
use erp_common::{ConfigLoader, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// CLI configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConsoleConfig {
    /// API configuration
    pub api: ApiConfig,

    /// Session storage configuration
    pub session: SessionConfig,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the ERP backend
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Token refresh endpoint path
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    /// Login endpoint path
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_timeout() -> u64 {
    erp_sdk::client::DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_refresh_path() -> String {
    erp_sdk::auth::DEFAULT_REFRESH_PATH.to_string()
}

fn default_login_path() -> String {
    erp_sdk::DEFAULT_LOGIN_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: erp_sdk::DEFAULT_API_URL.to_string(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionConfig {
    /// Directory holding `session.json`; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl ConfigLoader for ConsoleConfig {
    const ENV_PREFIX: &'static str = "ERP_";
}

impl ConsoleConfig {
    /// Load configuration from a specific path, then apply `ERP_*` overrides
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let mut config = <Self as ConfigLoader>::load_from_file(path)?;

        if let Some(dir) = &config.session.data_dir {
            config.session.data_dir = Some(expand_tilde(dir));
        }

        Ok(config)
    }

    /// Save configuration to specific path
    pub async fn save_to_path(&self, path: &Path) -> Result<()> {
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, self.to_toml()?).await?;

        info!("Configuration saved successfully");
        Ok(())
    }

    /// Get configuration value by key
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "api.base_url" | "api-url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" | "timeout" => Ok(self.api.timeout_secs.to_string()),
            "api.connect_timeout_secs" | "connect-timeout" => {
                Ok(self.api.connect_timeout_secs.to_string())
            }
            "api.refresh_path" => Ok(self.api.refresh_path.clone()),
            "api.login_path" => Ok(self.api.login_path.clone()),
            "session.data_dir" | "data-dir" => Ok(self
                .session
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default()),
            _ => Err(CliError::invalid_argument(format!(
                "Unknown configuration key: {key}"
            ))),
        }
    }

    /// Set configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" | "api-url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(invalid_value(key, "API URL must start with http:// or https://"));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" | "timeout" => {
                self.api.timeout_secs = parse_positive(key, value)?;
            }
            "api.connect_timeout_secs" | "connect-timeout" => {
                self.api.connect_timeout_secs = parse_positive(key, value)?;
            }
            "api.refresh_path" => {
                self.api.refresh_path = parse_path(key, value)?;
            }
            "api.login_path" => {
                self.api.login_path = parse_path(key, value)?;
            }
            "session.data_dir" | "data-dir" => {
                self.session.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(expand_tilde(Path::new(value)))
                };
            }
            _ => {
                return Err(CliError::invalid_argument(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }
        Ok(())
    }

    /// Get all configuration as key-value pairs
    pub fn to_map(&self) -> BTreeMap<String, String> {
        [
            "api.base_url",
            "api.timeout_secs",
            "api.connect_timeout_secs",
            "api.refresh_path",
            "api.login_path",
            "session.data_dir",
        ]
        .into_iter()
        .filter_map(|key| self.get(key).ok().map(|value| (key.to_string(), value)))
        .collect()
    }

    /// Directory holding the session file
    pub fn session_dir(&self) -> Result<PathBuf> {
        match &self.session.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(erp_sdk::auth::types::get_sdk_data_dir()?),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs)
    }
}

fn invalid_value(key: &str, reason: impl Into<String>) -> CliError {
    ConfigurationError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(0) => Err(invalid_value(key, "must be greater than 0")),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid_value(key, "must be a positive number of seconds")),
    }
}

fn parse_path(key: &str, value: &str) -> Result<String> {
    if !value.starts_with('/') {
        return Err(invalid_value(key, "endpoint paths must start with '/'"));
    }
    Ok(value.to_string())
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(path_str) => PathBuf::from(shellexpand::tilde(path_str).as_ref()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.refresh_path, "/api/user/refresh");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert!(config.session.data_dir.is_none());
    }

    #[test]
    fn test_get_and_set() {
        let mut config = ConsoleConfig::default();

        config.set("api-url", "https://erp.example.com/").unwrap();
        assert_eq!(config.get("api.base_url").unwrap(), "https://erp.example.com");

        config.set("timeout", "15").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(15));

        assert!(matches!(
            config.set("timeout", "0"),
            Err(CliError::Config(ConfigurationError::InvalidValue { .. }))
        ));
        assert!(config.set("timeout", "soon").is_err());
        assert!(config.set("api-url", "ftp://erp").is_err());
        assert!(config.set("api.refresh_path", "refresh").is_err());
        assert!(matches!(
            config.set("unknown", "x"),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_data_dir_tilde_expansion() {
        let mut config = ConsoleConfig::default();
        config.set("data-dir", "~/erp-session").unwrap();
        let dir = config.session.data_dir.clone().unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));

        config.set("data-dir", "").unwrap();
        assert!(config.session.data_dir.is_none());
    }

    #[test]
    fn test_to_map_lists_every_key() {
        let map = ConsoleConfig::default().to_map();
        assert_eq!(map.len(), 6);
        assert_eq!(map["api.login_path"], "/api/user/login");
    }
}
