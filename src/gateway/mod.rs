//! Bearer-authenticated access to the `IntelliTask` REST API.
//!
//! Every backend call made by the session and board modules goes through
//! an [`ports::ApiTransport`], which attaches the caller's credential and
//! normalises error responses into [`domain::HttpError`]:
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
