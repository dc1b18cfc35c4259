//! Task board with optimistic status transitions.
//!
//! The board owns a client-side cache of the actor's tasks. Moving a task
//! to another column updates the cache immediately, records a pending
//! transition, and confirms it with the backend in the background. A
//! rejected update is reconciled by reloading the whole board, since the
//! backend is the only authority on concurrent edits by other actors:
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
