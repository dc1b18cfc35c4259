//! Adapter implementations for backend access.

pub mod http;
pub mod memory;
