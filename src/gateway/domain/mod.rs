//! Request and error values exchanged with the backend.

mod error;
mod request;

pub use error::{ApiError, HttpError};
pub use request::{ApiRequest, HttpMethod};
