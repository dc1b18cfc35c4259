//! Port contracts for the task board.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod backend;

pub use backend::{CommentBackend, TaskBackend};
