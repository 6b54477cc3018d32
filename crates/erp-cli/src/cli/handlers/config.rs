//! Configuration command handlers

use crate::cli::commands::ConfigAction;
use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::output::{compress_path, json_output, print_success};
use std::path::Path;

/// Handle `erp config`
pub async fn handle_config(action: ConfigAction, config_path: &Path, json: bool) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = ConsoleConfig::load_from_path(config_path)?;
            let map = config.to_map();
            if json {
                return json_output(&map);
            }
            for (key, value) in map {
                println!("{key} = {value}");
            }
        }
        ConfigAction::Path => {
            println!("{}", compress_path(config_path));
        }
        ConfigAction::Get { key } => {
            let config = ConsoleConfig::load_from_path(config_path)?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = ConsoleConfig::load_from_path(config_path)?;
            config.set(&key, &value)?;
            config.save_to_path(config_path).await?;
            print_success(&format!("Set {key} = {value}"));
        }
        ConfigAction::Reset => {
            ConsoleConfig::default().save_to_path(config_path).await?;
            print_success("Configuration reset to defaults");
        }
    }
    Ok(())
}
