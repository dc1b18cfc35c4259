//! reqwest-backed transport for the `IntelliTask` REST API.

use async_trait::async_trait;
use reqwest::{Method, StatusCode, header};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::gateway::{
    domain::{ApiError, ApiRequest, HttpError, HttpMethod},
    ports::{ApiResult, ApiTransport},
};
use crate::session::domain::Credential;

/// HTTP transport rooted at the configured API base URL.
#[derive(Debug, Clone)]
pub struct HttpApiTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiTransport {
    /// Creates a transport from client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::transport)?;
        Ok(Self {
            client,
            base_url: config.api_base_url().to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

const fn method_of(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl ApiTransport for HttpApiTransport {
    async fn send(&self, credential: &Credential, request: ApiRequest) -> ApiResult<Option<Value>> {
        let url = self.url(request.path());
        let mut builder = self
            .client
            .request(method_of(request.method()), &url)
            .header(header::AUTHORIZATION, credential.authorization_header())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::transport)?;

        if !status.is_success() {
            let err = HttpError::from_response(status.as_u16(), status.canonical_reason(), &text);
            tracing::debug!(
                method = %request.method(),
                path = request.path(),
                status = err.status,
                message = %err.message,
                "backend rejected request"
            );
            return Err(err.into());
        }
        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(ApiError::serialization)
    }
}
