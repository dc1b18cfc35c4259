//! Error types for backend calls.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Non-2xx response from the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("HTTP {status}: {message}")]
pub struct HttpError {
    /// Response status code.
    pub status: u16,
    /// Human-readable reason, preferring the body's `detail` field.
    pub message: String,
}

impl HttpError {
    /// Creates an error from a status and message.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Builds an error from a raw error response.
    ///
    /// The message is taken from the JSON `detail` field when present
    /// (strings verbatim, structured details as compact JSON), otherwise
    /// from the trimmed body, otherwise from `reason`.
    #[must_use]
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| value.get("detail").cloned())
            .map(|detail| match detail {
                Value::String(text) => text,
                other => other.to_string(),
            });
        let message = detail.unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                reason.unwrap_or("request failed").to_owned()
            } else {
                trimmed.to_owned()
            }
        });
        Self::new(status, message)
    }

    /// Returns `true` for 5xx statuses.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

/// Errors returned by backend calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No ready session was available to authorize the call.
    #[error("not authenticated")]
    Unauthenticated,

    /// The backend answered with a non-2xx status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A payload could not be encoded or decoded.
    #[error("invalid payload: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Wraps a transport failure.
    pub fn transport(err: impl fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    /// Wraps a payload encoding or decoding failure.
    pub fn serialization(err: impl fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Returns the HTTP status when the backend answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}
