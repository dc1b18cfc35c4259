//! Client configuration for the backend connection.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file in the working directory.

use std::time::Duration;

use thiserror::Error;

use crate::board::domain::{ParseTaskScopeError, TaskScope};

/// Base URL used when `INTELLITASK_API_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable holding the backend base URL.
pub const API_URL_VAR: &str = "INTELLITASK_API_URL";

/// Environment variable holding the request timeout in whole seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "INTELLITASK_REQUEST_TIMEOUT_SECS";

/// Environment variable selecting which task listing the board loads.
pub const TASK_SCOPE_VAR: &str = "INTELLITASK_TASK_SCOPE";

/// Errors raised while assembling a [`ClientConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The API base URL was blank.
    #[error("api base url must not be empty")]
    EmptyBaseUrl,

    /// The timeout was not a positive whole number of seconds.
    #[error("invalid request timeout '{0}', expected a positive number of seconds")]
    InvalidTimeout(String),

    /// The task scope was not recognised.
    #[error(transparent)]
    InvalidTaskScope(#[from] ParseTaskScopeError),
}

/// Connection settings shared by the HTTP transport and the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    request_timeout: Option<Duration>,
    task_scope: TaskScope,
}

impl ClientConfig {
    /// Creates a configuration for the given base URL.
    ///
    /// Trailing slashes are removed so request paths can be appended
    /// directly. No timeout is applied and the board loads the caller's
    /// assigned tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBaseUrl`] when the URL is blank.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = api_base_url.into();
        let normalized = raw.trim().trim_end_matches('/');
        if normalized.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        Ok(Self {
            api_base_url: normalized.to_owned(),
            request_timeout: None,
            task_scope: TaskScope::Assigned,
        })
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the task listing the board loads.
    #[must_use]
    pub const fn with_task_scope(mut self, scope: TaskScope) -> Self {
        self.task_scope = scope;
        self
    }

    /// Loads configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(error = %err, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let mut config = Self::new(base_url)?;

        if let Some(raw_timeout) = lookup(REQUEST_TIMEOUT_VAR) {
            config = config.with_request_timeout(parse_timeout(&raw_timeout)?);
        }
        if let Some(raw_scope) = lookup(TASK_SCOPE_VAR) {
            config = config.with_task_scope(TaskScope::try_from(raw_scope.as_str())?);
        }
        Ok(config)
    }

    /// Returns the backend base URL without a trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Returns the per-request timeout, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Returns the task listing the board loads.
    #[must_use]
    pub const fn task_scope(&self) -> TaskScope {
        self.task_scope
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(Duration::from_secs(seconds)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_owned())),
    }
}
