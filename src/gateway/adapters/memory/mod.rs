//! In-memory stand-in for the task backend.

mod backend;

pub use backend::{BackendUser, InMemoryBackend, RecordedRequest};
