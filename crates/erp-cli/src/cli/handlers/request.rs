//! Generic API request handlers
//!
//! Every command goes through the SDK client, so an expired access token is
//! renewed transparently. When renewal fails the session is gone and the
//! user is told to log in again.

use crate::cli::commands::{BodyArgs, BodySource};
use crate::client::{create_authenticated_client, session_aware_error};
use crate::config::ConsoleConfig;
use crate::error::{CliError, Result};
use crate::output::{json_output, print_response, print_success};
use serde_json::Value;
use tracing::debug;

/// Methods that carry a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Post,
    Put,
    Patch,
}

/// Handle `erp get`
pub async fn handle_get(
    path: &str,
    query: &[(String, String)],
    config: &ConsoleConfig,
    json: bool,
) -> Result<()> {
    let client = create_authenticated_client(config).await?;
    debug!("GET {} with {} query parameters", path, query.len());

    let result = if query.is_empty() {
        client.get::<Value>(path).await
    } else {
        client.get_with_query::<_, Value>(path, query).await
    };

    let value = result.map_err(|e| session_aware_error(&client, e))?;
    print_response(&value, json)
}

/// Handle `erp post|put|patch`
pub async fn handle_send(
    verb: Verb,
    path: &str,
    body: &BodyArgs,
    config: &ConsoleConfig,
    json: bool,
) -> Result<()> {
    let body = read_body(body).await?;
    let client = create_authenticated_client(config).await?;
    debug!("{:?} {}", verb, path);

    let result = match verb {
        Verb::Post => client.post::<_, Value>(path, &body).await,
        Verb::Put => client.put::<_, Value>(path, &body).await,
        Verb::Patch => client.patch::<_, Value>(path, &body).await,
    };

    let value = result.map_err(|e| session_aware_error(&client, e))?;
    print_response(&value, json)
}

/// Handle `erp delete`
pub async fn handle_delete(path: &str, config: &ConsoleConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config).await?;
    debug!("DELETE {}", path);

    client
        .delete(path)
        .await
        .map_err(|e| session_aware_error(&client, e))?;

    if json {
        json_output(&serde_json::json!({ "deleted": path }))
    } else {
        print_success(&format!("Deleted {path}"));
        Ok(())
    }
}

/// Resolve `--data` into a JSON value. No data sends an empty object.
pub async fn read_body(body: &BodyArgs) -> Result<Value> {
    let raw = match body.source() {
        BodySource::Empty => return Ok(Value::Object(Default::default())),
        BodySource::Inline(raw) => raw,
        BodySource::File(path) => tokio::fs::read_to_string(&path).await.map_err(|e| {
            CliError::invalid_argument(format!("Cannot read {}: {e}", path.display()))
        })?,
    };

    serde_json::from_str(&raw)
        .map_err(|e| CliError::invalid_argument(format!("Request body is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_inline_body() {
        let body = BodyArgs {
            data: Some(r#"{"sku":"A-1","qty":2}"#.to_string()),
        };
        let value = read_body(&body).await.unwrap();
        assert_eq!(value["qty"], 2);
    }

    #[tokio::test]
    async fn test_read_body_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"Acme"}}"#).unwrap();

        let body = BodyArgs {
            data: Some(format!("@{}", file.path().display())),
        };
        let value = read_body(&body).await.unwrap();
        assert_eq!(value["name"], "Acme");
    }

    #[tokio::test]
    async fn test_invalid_body_rejected() {
        let body = BodyArgs {
            data: Some("{not json".to_string()),
        };
        assert!(matches!(
            read_body(&body).await,
            Err(CliError::InvalidArgument(_))
        ));

        let missing = BodyArgs {
            data: Some("@/nonexistent/erp-body.json".to_string()),
        };
        assert!(matches!(
            read_body(&missing).await,
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_object() {
        let value = read_body(&BodyArgs::default()).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
