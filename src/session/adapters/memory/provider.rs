//! Scriptable identity provider for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::session::{
    domain::{Credential, Principal},
    ports::{AuthEvent, AuthSubscription, IdentityProvider, ProviderError, ProviderResult},
};

/// Thread-safe identity provider driven entirely from code.
///
/// Accounts map a principal to the bearer token issued for it. Events are
/// pushed to every live subscriber with [`InMemoryIdentityProvider::emit`];
/// interactive sign-in and sign-out emit the matching event themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    state: Arc<Mutex<ProviderState>>,
}

#[derive(Debug, Default)]
struct ProviderState {
    subscribers: HashMap<u64, mpsc::UnboundedSender<AuthEvent>>,
    next_subscriber: u64,
    tokens: HashMap<String, String>,
    interactive: Option<Principal>,
    subscription_failure: Option<String>,
    credential_failure: Option<String>,
    sign_out_failure: Option<String>,
    sign_out_calls: usize,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account and the token issued for it.
    ///
    /// The first registered account is also the one interactive sign-in
    /// returns, unless [`Self::set_interactive_principal`] overrides it.
    #[must_use]
    pub fn with_account(self, principal: &Principal, token: impl Into<String>) -> Self {
        {
            let mut state = self.state();
            state.tokens.insert(principal.uid().to_owned(), token.into());
            if state.interactive.is_none() {
                state.interactive = Some(principal.clone());
            }
        }
        self
    }

    /// Chooses the principal interactive sign-in returns; `None` cancels.
    pub fn set_interactive_principal(&self, principal: Option<Principal>) {
        self.state().interactive = principal;
    }

    /// Delivers an event to every live subscriber, in registration order.
    pub fn emit(&self, event: &AuthEvent) {
        let state = self.state();
        let mut ids: Vec<_> = state.subscribers.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let delivered = state
                .subscribers
                .get(&id)
                .is_some_and(|sender| sender.send(event.clone()).is_ok());
            if !delivered {
                tracing::debug!(subscriber = id, "auth-state subscriber went away");
            }
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    /// Returns how many times sign-out was requested.
    #[must_use]
    pub fn sign_out_calls(&self) -> usize {
        self.state().sign_out_calls
    }

    /// Makes subsequent subscription attempts fail.
    pub fn fail_subscriptions(&self, message: impl Into<String>) {
        self.state().subscription_failure = Some(message.into());
    }

    /// Makes subsequent credential requests fail.
    pub fn fail_credentials(&self, message: impl Into<String>) {
        self.state().credential_failure = Some(message.into());
    }

    /// Makes subsequent sign-out requests fail after being counted.
    pub fn fail_sign_out(&self, message: impl Into<String>) {
        self.state().sign_out_failure = Some(message.into());
    }

    /// Closes every live subscription stream.
    pub fn close_streams(&self) {
        self.state().subscribers.clear();
    }

    fn state(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn subscribe_auth_state(&self) -> ProviderResult<AuthSubscription> {
        let mut state = self.state();
        if let Some(message) = &state.subscription_failure {
            return Err(ProviderError::provider(message.clone()));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.insert(id, sender);

        let registry = Arc::clone(&self.state);
        Ok(AuthSubscription::new(receiver, move || {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscribers
                .remove(&id);
        }))
    }

    async fn get_credential(&self, principal: &Principal) -> ProviderResult<Credential> {
        let state = self.state();
        if let Some(message) = &state.credential_failure {
            return Err(ProviderError::provider(message.clone()));
        }
        state
            .tokens
            .get(principal.uid())
            .map(Credential::new)
            .ok_or_else(|| ProviderError::provider(format!("no account for {principal}")))
    }

    async fn sign_in_interactive(&self) -> ProviderResult<Principal> {
        let principal = self
            .state()
            .interactive
            .clone()
            .ok_or(ProviderError::UserCancelled)?;
        self.emit(&AuthEvent::LoggedIn(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        let failure = {
            let mut state = self.state();
            state.sign_out_calls += 1;
            state.sign_out_failure.clone()
        };
        if let Some(message) = failure {
            return Err(ProviderError::provider(message));
        }
        self.emit(&AuthEvent::LoggedOut);
        Ok(())
    }
}
