//! Adapter implementations of the session ports.

pub mod gateway;
pub mod memory;
pub mod static_token;
