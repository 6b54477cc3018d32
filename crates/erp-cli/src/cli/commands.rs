use clap::Subcommand;
use std::path::PathBuf;

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long, short = 'e', env = "ERP_EMAIL")]
        email: Option<String>,
    },

    /// Log out and remove stored session data
    Logout,

    /// Show session status
    Status,

    /// Send a GET request to an API path
    Get {
        /// API path, e.g. /api/orders
        path: String,

        /// Query parameters as key=value (repeatable)
        #[arg(long, short = 'Q', value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },

    /// Send a POST request with a JSON body
    Post {
        /// API path
        path: String,

        #[command(flatten)]
        body: BodyArgs,
    },

    /// Send a PUT request with a JSON body
    Put {
        /// API path
        path: String,

        #[command(flatten)]
        body: BodyArgs,
    },

    /// Send a PATCH request with a JSON body
    Patch {
        /// API path
        path: String,

        #[command(flatten)]
        body: BodyArgs,
    },

    /// Send a DELETE request to an API path
    Delete {
        /// API path
        path: String,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Request body options
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BodyArgs {
    /// JSON body, or @<file> to read it from a file
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

/// Body source after resolving `@file` syntax
#[derive(Debug, Clone, PartialEq)]
pub enum BodySource {
    Inline(String),
    File(PathBuf),
    Empty,
}

impl BodyArgs {
    pub fn source(&self) -> BodySource {
        match self.data.as_deref() {
            None => BodySource::Empty,
            Some(data) => match data.strip_prefix('@') {
                Some(file) => BodySource::File(PathBuf::from(file)),
                None => BodySource::Inline(data.to_string()),
            },
        }
    }
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=value: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("status=open").unwrap(),
            ("status".to_string(), "open".to_string())
        );
        assert_eq!(
            parse_key_val("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("status").is_err());
        assert!(parse_key_val("=open").is_err());
    }

    #[test]
    fn test_body_source() {
        let inline = BodyArgs {
            data: Some(r#"{"qty":1}"#.to_string()),
        };
        assert_eq!(inline.source(), BodySource::Inline(r#"{"qty":1}"#.to_string()));

        let file = BodyArgs {
            data: Some("@order.json".to_string()),
        };
        assert_eq!(file.source(), BodySource::File(PathBuf::from("order.json")));

        assert_eq!(BodyArgs::default().source(), BodySource::Empty);
    }
}
