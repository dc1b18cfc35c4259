//! Identity provider port: auth-state subscription and credential issue.

use crate::session::domain::{Credential, Principal};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for identity provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Change in the provider's notion of who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// The provider reports a signed-in principal.
    LoggedIn(Principal),
    /// The provider reports that no one is signed in.
    LoggedOut,
}

type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// Scoped registration on the provider's auth-state stream.
///
/// Events arrive in the order the provider emitted them. Dropping the
/// subscription deregisters the listener.
pub struct AuthSubscription {
    events: mpsc::UnboundedReceiver<AuthEvent>,
    unsubscribe: Option<Unsubscribe>,
}

impl AuthSubscription {
    /// Wraps an event receiver and the hook that deregisters it.
    #[must_use]
    pub fn new(
        events: mpsc::UnboundedReceiver<AuthEvent>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Waits for the next auth-state event.
    ///
    /// Returns `None` once the provider has closed the stream.
    pub async fn next_event(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }
}

impl fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("registered", &self.unsubscribe.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Identity provider contract.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers a listener on the auth-state stream.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Provider`] when the provider cannot accept
    /// listeners.
    fn subscribe_auth_state(&self) -> ProviderResult<AuthSubscription>;

    /// Issues a fresh bearer credential for the principal.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the provider refuses or cannot be
    /// reached.
    async fn get_credential(&self, principal: &Principal) -> ProviderResult<Credential>;

    /// Runs the provider's interactive sign-in.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UserCancelled`] when the user backs out.
    async fn sign_in_interactive(&self) -> ProviderResult<Principal>;

    /// Signs the current principal out of the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Provider`] when the provider call fails.
    async fn sign_out(&self) -> ProviderResult<()>;
}

/// Errors returned by identity provider implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user dismissed the interactive sign-in.
    #[error("sign-in cancelled by user")]
    UserCancelled,

    /// The provider failed.
    #[error("identity provider error: {0}")]
    Provider(String),
}

impl ProviderError {
    /// Wraps a provider failure message.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}
