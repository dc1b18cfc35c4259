//! Step definitions for board transition scenarios.

pub mod given;
pub mod when;
pub mod world;
