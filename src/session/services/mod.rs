//! Application services for the session lifecycle.

mod manager;

pub use manager::{SessionError, SessionHandle, SessionManager, SessionResult};
