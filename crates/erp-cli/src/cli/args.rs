use crate::cli::{commands::Commands, handlers};
use crate::config::{expand_tilde, ConsoleConfig};
use crate::error::Result;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

/// ERP CLI - Administration console for the ERP backend
#[derive(Parser, Debug)]
#[command(
    name = "erp",
    author = "ERP Console Team",
    version,
    about = "ERP CLI - Administration console for the ERP backend",
    long_about = "Command-line console for the ERP administration backend.

SESSION:
  erp login                         # Log in with email and password
  erp status                        # Show session status
  erp logout                        # End the session

REQUESTS:
  erp get /api/orders -Q status=open
  erp post /api/orders -d '{\"sku\":\"A-1\",\"qty\":2}'
  erp put /api/customers/7 -d @customer.json
  erp delete /api/orders/42

CONFIGURATION:
  erp config show                   # Show configuration
  erp config set api.base_url https://erp.example.com"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "~/.erp/config.toml")]
    pub config: PathBuf,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        use handlers::request::Verb;

        let config_path = expand_tilde(&self.config);
        let load = || ConsoleConfig::load_from_path(&config_path);
        let json = self.json;

        match self.command {
            // Session
            Commands::Login { email } => handlers::auth::handle_login(email, &load()?).await,
            Commands::Logout => handlers::auth::handle_logout(&load()?).await,
            Commands::Status => handlers::auth::handle_status(&load()?, json).await,

            // Requests
            Commands::Get { path, query } => {
                handlers::request::handle_get(&path, &query, &load()?, json).await
            }
            Commands::Post { path, body } => {
                handlers::request::handle_send(Verb::Post, &path, &body, &load()?, json).await
            }
            Commands::Put { path, body } => {
                handlers::request::handle_send(Verb::Put, &path, &body, &load()?, json).await
            }
            Commands::Patch { path, body } => {
                handlers::request::handle_send(Verb::Patch, &path, &body, &load()?, json).await
            }
            Commands::Delete { path } => {
                handlers::request::handle_delete(&path, &load()?, json).await
            }

            // Configuration
            Commands::Config { action } => {
                handlers::config::handle_config(action, &config_path, json).await
            }
        }
    }
}
