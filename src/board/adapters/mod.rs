//! Adapter implementations for board ports.

pub mod gateway;
