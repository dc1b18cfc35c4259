//! `IntelliTask`: session bootstrap and optimistic task board core.
//!
//! This crate holds the client-side state machines behind the `IntelliTask`
//! dashboard: resolving who is signed in and what they may do, and moving
//! tasks between board columns with immediate local feedback that is later
//! confirmed or reconciled against the backend.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure session and task types with no infrastructure
//!   dependencies
//! - **Ports**: Abstract trait interfaces for the identity provider, the
//!   backend API and the task endpoints
//! - **Adapters**: Concrete implementations of ports (reqwest transport,
//!   in-memory fakes)
//!
//! # Modules
//!
//! - [`session`]: Authenticated identity lifecycle and role resolution
//! - [`gateway`]: Bearer-authenticated access to the backend REST API
//! - [`board`]: Task cache with optimistic status transitions
//! - [`config`]: Client configuration loaded from the environment
//! - [`telemetry`]: Tracing subscriber installation

pub mod board;
pub mod config;
pub mod gateway;
pub mod session;
pub mod telemetry;
