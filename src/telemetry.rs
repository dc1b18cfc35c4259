//! Tracing subscriber installation.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    /// The fallback filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Installs a formatted tracing subscriber for the process.
///
/// `RUST_LOG` takes precedence; `default_filter` applies when it is unset
/// or unparsable.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when `default_filter` is not a
/// valid directive and [`TelemetryError::AlreadyInitialised`] when a global
/// subscriber has already been set.
pub fn init_tracing(default_filter: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|err| TelemetryError::InvalidFilter(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInitialised(err.to_string()))
}
