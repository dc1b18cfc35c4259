//! Authorization tier granted by the backend.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};

/// Authorization tier of the current session.
///
/// Only [`Role::Admin`] and [`Role::Developer`] are ever granted by the
/// backend; the remaining variants describe sessions without a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages projects, users and the full task board.
    Admin,
    /// Works on approved tasks assigned to them.
    Developer,
    /// A lookup is pending or has not been attempted.
    Unresolved,
    /// No one is signed in.
    None,
}

impl Role {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Developer => "developer",
            Self::Unresolved => "unresolved",
            Self::None => "none",
        }
    }

    /// Returns `true` for roles granted by the backend.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Admin | Self::Developer)
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    /// Parses a backend role. Only granted roles are accepted.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "developer" => Ok(Self::Developer),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}
