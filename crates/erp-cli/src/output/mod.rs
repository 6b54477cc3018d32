//! Terminal rendering for command results
//!
//! Status lines go to stdout with a coloured marker; errors go to stderr.
//! API responses are printed as pretty JSON unless they are a bare string
//! or empty and `--json` was not requested.

use crate::error::Result;
use console::style;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Print any serializable value as pretty JSON
pub fn json_output<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print the body of an API response
pub fn print_response(value: &Value, json: bool) -> Result<()> {
    if json {
        return json_output(value);
    }
    if value.is_null() {
        return Ok(());
    }
    match render_plain(value) {
        Some(text) => {
            println!("{text}");
            Ok(())
        }
        None => json_output(value),
    }
}

/// Plain rendering for scalar bodies that do not need JSON framing
fn render_plain(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        _ => None,
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Indented `label: value` line under a status message
pub fn print_field(label: &str, value: &str) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Show `path` relative to the home directory when it lives there
pub fn compress_path(path: &Path) -> String {
    let expanded = shellexpand::tilde("~");
    let home: &str = &expanded;
    match path.strip_prefix(home) {
        Ok(relative) if home != "~" => format!("~/{}", relative.display()),
        _ => path.display().to_string(),
    }
}
