//! Port contracts for the session lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by the session
//! manager.

pub mod identity_provider;
pub mod role_directory;

pub use identity_provider::{
    AuthEvent, AuthSubscription, IdentityProvider, ProviderError, ProviderResult,
};
pub use role_directory::{RoleDirectory, RoleLookupError, RoleLookupResult};
