//! Transport port for credentialed backend calls.

use crate::gateway::domain::{ApiError, ApiRequest};
use crate::session::domain::Credential;
use async_trait::async_trait;
use serde_json::Value;

/// Result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Backend request contract.
///
/// Implementations attach `Authorization: Bearer <credential>` and
/// `Content-Type: application/json` to every call.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Sends a request and returns its JSON payload.
    ///
    /// Returns `Ok(None)` for `204 No Content` and empty bodies.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] for non-2xx responses,
    /// [`ApiError::Transport`] when no response arrives, and
    /// [`ApiError::Serialization`] when a 2xx body is not JSON.
    async fn send(&self, credential: &Credential, request: ApiRequest) -> ApiResult<Option<Value>>;
}
