//! Identity provider backed by a pre-issued token.
//!
//! Used by the command-line client, where the bearer token is obtained out
//! of band and handed over through the environment.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::{
    domain::{Credential, Principal},
    ports::{AuthEvent, AuthSubscription, IdentityProvider, ProviderError, ProviderResult},
};

/// Provider that reports a single fixed sign-in.
///
/// Each subscription immediately yields [`AuthEvent::LoggedIn`] for the
/// configured principal and then closes.
#[derive(Debug, Clone)]
pub struct StaticTokenIdentityProvider {
    principal: Principal,
    credential: Credential,
}

impl StaticTokenIdentityProvider {
    /// Creates a provider for `principal` holding `token`.
    #[must_use]
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal,
            credential: Credential::new(token),
        }
    }

    /// Returns the configured principal.
    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentityProvider {
    fn subscribe_auth_state(&self) -> ProviderResult<AuthSubscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        sender
            .send(AuthEvent::LoggedIn(self.principal.clone()))
            .map_err(|err| ProviderError::provider(err.to_string()))?;
        Ok(AuthSubscription::new(receiver, || {}))
    }

    async fn get_credential(&self, principal: &Principal) -> ProviderResult<Credential> {
        if principal == &self.principal {
            Ok(self.credential.clone())
        } else {
            Err(ProviderError::provider(format!(
                "no token held for {principal}"
            )))
        }
    }

    async fn sign_in_interactive(&self) -> ProviderResult<Principal> {
        Err(ProviderError::provider(
            "interactive sign-in is not available with a static token",
        ))
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        Ok(())
    }
}
