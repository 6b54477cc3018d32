//! Main entry point for the ERP CLI

use clap::Parser;
use clap_verbosity_flag::LevelFilter;
use color_eyre::eyre::{eyre, Result};
use erp_cli::cli::Args;
use erp_cli::error::CliError;
use erp_cli::output::print_error;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // No source locations or env hints in error reports
    color_eyre::config::HookBuilder::default()
        .display_location_section(false)
        .display_env_section(false)
        .install()?;

    if args.verbosity.log_level_filter() >= LevelFilter::Debug {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }

    erp_common::logging::init_cli_logging(&args.verbosity, "erp=warn,erp_cli=warn,erp_sdk=warn")
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    match args.run().await {
        Ok(()) => Ok(()),
        Err(e @ (CliError::NotLoggedIn | CliError::SessionExpired)) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
