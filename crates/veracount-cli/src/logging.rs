//! Logging initialization.

use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;
use crate::error::CliError;

/// Install a stderr fmt subscriber so stdout carries only the run summary.
///
/// `RUST_LOG` wins over `level` when it is set.
pub fn init_logging(level: LogLevel) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}
