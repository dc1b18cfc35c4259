//! Domain model for the authenticated session.
//!
//! A session pairs an identity provider principal with the bearer
//! credential and backend role derived from it. Constructors only produce
//! combinations that respect the phase invariants, so no consumer can
//! observe a role without an identity.

mod error;
mod identity;
mod role;
mod session;

pub use error::{ParseRoleError, SessionDomainError};
pub use identity::{Credential, Principal};
pub use role::Role;
pub use session::{Session, SessionPhase};
