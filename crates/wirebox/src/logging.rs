//! Structured logging with tracing
//!
//! Centralized logging bootstrap for binaries embedding the
//! container. The filter comes from `WIREBOX_LOG` when set, otherwise
//! from the configured level.

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use wirebox_core::constants::LOG_ENV_VAR;
use wirebox_core::error::{Error, Result};

/// Initialize logging with the provided default level
pub fn init_logging(level: &str) -> Result<()> {
    parse_log_level(level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| Error::configuration(format!("failed to initialize logging: {e}")))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse a log level string to a tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {}. Use trace, debug, info, warn, or error",
            level
        ))),
    }
}
