//! Role directory port: resolves the backend role for a credential.

use crate::gateway::domain::ApiError;
use crate::session::domain::{Credential, ParseRoleError, Role};
use async_trait::async_trait;
use thiserror::Error;

/// Result type for role lookups.
pub type RoleLookupResult<T> = Result<T, RoleLookupError>;

/// Backend lookup of the authorization tier for a credential.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// Returns the role the backend grants to the credential's owner.
    ///
    /// # Errors
    ///
    /// Returns [`RoleLookupError`] when the call fails or the response does
    /// not carry a granted role.
    async fn lookup_role(&self, credential: &Credential) -> RoleLookupResult<Role>;
}

/// Errors returned by role directory implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleLookupError {
    /// The backend call failed.
    #[error("role lookup failed: {0}")]
    Api(#[from] ApiError),

    /// The profile carried no role.
    #[error("profile has no role")]
    MissingRole,

    /// The profile carried a role this client does not recognise.
    #[error(transparent)]
    UnknownRole(#[from] ParseRoleError),
}
