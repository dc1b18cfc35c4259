//! Port contracts for backend access.

pub mod transport;

pub use transport::{ApiResult, ApiTransport};
