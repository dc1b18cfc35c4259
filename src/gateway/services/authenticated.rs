//! Session-aware wrapper around an [`ApiTransport`].

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

use crate::gateway::{
    domain::{ApiError, ApiRequest},
    ports::{ApiResult, ApiTransport},
};
use crate::session::services::SessionHandle;

/// Sends backend requests with the current session's credential.
///
/// Calls fail with [`ApiError::Unauthenticated`] unless the session is
/// ready; no refresh is attempted.
pub struct AuthenticatedApi<T>
where
    T: ApiTransport,
{
    transport: Arc<T>,
    session: SessionHandle,
}

impl<T> Clone for AuthenticatedApi<T>
where
    T: ApiTransport,
{
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            session: self.session.clone(),
        }
    }
}

impl<T> AuthenticatedApi<T>
where
    T: ApiTransport,
{
    /// Creates a wrapper reading credentials from `session`.
    #[must_use]
    pub const fn new(transport: Arc<T>, session: SessionHandle) -> Self {
        Self { transport, session }
    }

    /// Sends a raw request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthenticated`] when the session is not ready,
    /// otherwise whatever the transport reports.
    pub async fn send(&self, request: ApiRequest) -> ApiResult<Option<Value>> {
        let credential = self
            .session
            .current_credential()
            .map_err(|_| ApiError::Unauthenticated)?;
        self.transport.send(&credential, request).await
    }

    /// Sends a `GET` and decodes the required JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] when the body is missing or
    /// does not match `R`.
    pub async fn get_json<R>(&self, path: &str) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let payload = self.send(ApiRequest::get(path)).await?;
        decode_required(payload)
    }

    /// Sends a `PUT` with a JSON body and decodes the optional response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] when the body cannot be encoded
    /// or the response does not match `R`.
    pub async fn put_json<B, R>(&self, path: &str, body: &B) -> ApiResult<Option<R>>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload = self.send(ApiRequest::put(path, encode(body)?)).await?;
        payload.map(decode).transpose()
    }

    /// Sends a `POST` with a JSON body and decodes the required response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] when the body cannot be encoded
    /// or the response is missing or does not match `R`.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let payload = self.send(ApiRequest::post(path, encode(body)?)).await?;
        decode_required(payload)
    }

    /// Sends a `DELETE`, discarding any response body.
    ///
    /// # Errors
    ///
    /// Returns whatever [`AuthenticatedApi::send`] reports.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }
}

fn encode<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(ApiError::serialization)
}

fn decode<R: DeserializeOwned>(value: Value) -> ApiResult<R> {
    serde_json::from_value(value).map_err(ApiError::serialization)
}

fn decode_required<R: DeserializeOwned>(payload: Option<Value>) -> ApiResult<R> {
    let value =
        payload.ok_or_else(|| ApiError::serialization("expected a JSON body, got none"))?;
    decode(value)
}
