//! Authenticated session lifecycle.
//!
//! The session module keeps a single, explicitly owned record of who is
//! signed in and which role the backend granted them. Identity provider
//! events are consumed from a scoped subscription and folded into the
//! session one at a time:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
