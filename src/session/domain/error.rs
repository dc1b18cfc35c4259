//! Error types for session domain validation and parsing.

use super::Role;
use thiserror::Error;

/// Errors returned while constructing session values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionDomainError {
    /// A ready session requires an authorization tier granted by the backend.
    #[error("cannot mark session ready with role '{}'", .0.as_str())]
    UnresolvedRole(Role),
}

/// Error returned while parsing a role reported by the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
