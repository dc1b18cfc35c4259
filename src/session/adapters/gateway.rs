//! Role directory backed by the task backend's profile endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::gateway::{
    domain::{ApiError, ApiRequest},
    ports::ApiTransport,
};
use crate::session::{
    domain::{Credential, Role},
    ports::{RoleDirectory, RoleLookupError, RoleLookupResult},
};

/// Path of the signed-in user's profile.
pub const PROFILE_PATH: &str = "/users/me";

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    role: Option<String>,
}

/// Looks up the role with `GET /users/me`.
///
/// The call is made with the credential being resolved, before the session
/// is ready, so it goes straight to the transport.
pub struct GatewayRoleDirectory<T>
where
    T: ApiTransport,
{
    transport: Arc<T>,
}

impl<T> GatewayRoleDirectory<T>
where
    T: ApiTransport,
{
    /// Creates a directory over `transport`.
    #[must_use]
    pub const fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T> RoleDirectory for GatewayRoleDirectory<T>
where
    T: ApiTransport,
{
    async fn lookup_role(&self, credential: &Credential) -> RoleLookupResult<Role> {
        let payload = self
            .transport
            .send(credential, ApiRequest::get(PROFILE_PATH))
            .await?
            .ok_or_else(|| ApiError::serialization("profile response had no body"))?;
        let profile: ProfileResponse =
            serde_json::from_value(payload).map_err(ApiError::serialization)?;
        let role = profile
            .role
            .filter(|role| !role.trim().is_empty())
            .ok_or(RoleLookupError::MissingRole)?;
        Ok(Role::try_from(role.as_str())?)
    }
}
