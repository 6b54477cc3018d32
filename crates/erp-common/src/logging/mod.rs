//! Unified logging initialization for ERP console binaries
//!
//! The effective filter is chosen in this order:
//! 1. CLI flags (`-v/-q`) - highest priority
//! 2. RUST_LOG environment variable
//! 3. Binary-specific defaults - lowest priority

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with the specified verbosity level and default filter.
///
/// # Example
///
/// ```no_run
/// use clap_verbosity_flag::{Verbosity, WarnLevel};
/// use erp_common::logging;
///
/// // Equivalent to passing `-vv` on the command line
/// let verbosity = Verbosity::<WarnLevel>::new(2, 0);
/// logging::init_logging(&verbosity, "erp_sdk=info").unwrap();
/// ```
pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    let filter = resolve_filter(verbosity, default_filter)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}

/// Initialize logging for the user-facing CLI.
///
/// Logging stays off unless a verbosity flag or `RUST_LOG` asks for it, so
/// command output is not interleaved with diagnostics.
///
/// Returns `true` if a subscriber was installed.
pub fn init_cli_logging<L: LogLevel>(
    verbosity: &Verbosity<L>,
    default_filter: &str,
) -> Result<bool> {
    if verbosity.is_present() || std::env::var("RUST_LOG").is_ok() {
        init_logging(verbosity, default_filter)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn resolve_filter<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<EnvFilter> {
    if verbosity.is_present() {
        let level = verbosity.log_level_filter().to_string().to_lowercase();
        return Ok(EnvFilter::try_new(level)?);
    }

    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_verbosity_flag::WarnLevel;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_explicit_verbosity_wins() {
        let verbosity = Verbosity::<WarnLevel>::new(2, 0);
        let filter = resolve_filter(&verbosity, "erp=error").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_quiet_flag_turns_logging_off() {
        let verbosity = Verbosity::<WarnLevel>::new(0, 4);
        let filter = resolve_filter(&verbosity, "erp=error").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::OFF));
    }
}
