//! Session manager: folds identity provider events into the session.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::session::{
    domain::{Credential, Principal, Role, Session, SessionDomainError, SessionPhase},
    ports::{
        AuthEvent, AuthSubscription, IdentityProvider, ProviderError, RoleDirectory,
        RoleLookupError,
    },
};

/// Service-level errors for session operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No ready session is available.
    #[error("not authenticated")]
    Unauthenticated,

    /// The identity provider failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The backend role lookup failed.
    #[error(transparent)]
    RoleLookup(#[from] RoleLookupError),

    /// The resolved values did not form a valid session.
    #[error(transparent)]
    Domain(#[from] SessionDomainError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Read-only view of the session published by a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    receiver: watch::Receiver<Session>,
}

impl SessionHandle {
    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Session {
        self.receiver.borrow().clone()
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.receiver.borrow().phase()
    }

    /// Returns the current role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.receiver.borrow().role()
    }

    /// Returns the credential while the session is ready.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthenticated`] in every other phase.
    pub fn current_credential(&self) -> SessionResult<Credential> {
        self.receiver
            .borrow()
            .ready_credential()
            .cloned()
            .ok_or(SessionError::Unauthenticated)
    }

    /// Waits for the next published session.
    ///
    /// Returns `None` once the manager has been dropped.
    pub async fn changed(&mut self) -> Option<Session> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

/// Single owner of the authenticated session.
///
/// Construct one per application and hand [`SessionHandle`]s to anything
/// that needs to read the session. Only the manager writes it.
pub struct SessionManager<P, D>
where
    P: IdentityProvider,
    D: RoleDirectory,
{
    provider: Arc<P>,
    directory: Arc<D>,
    state: watch::Sender<Session>,
}

impl<P, D> SessionManager<P, D>
where
    P: IdentityProvider,
    D: RoleDirectory,
{
    /// Creates a manager in the initializing phase.
    #[must_use]
    pub fn new(provider: Arc<P>, directory: Arc<D>) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        Self {
            provider,
            directory,
            state,
        }
    }

    /// Returns a read-only handle onto the session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            receiver: self.state.subscribe(),
        }
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Registers on the provider's auth-state stream.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Provider`] when the provider refuses the
    /// subscription. The session then enters [`SessionPhase::Error`] and
    /// stays there.
    pub fn subscribe(&self) -> SessionResult<AuthSubscription> {
        self.provider.subscribe_auth_state().map_err(|err| {
            tracing::error!(error = %err, "auth-state subscription failed; session disabled");
            self.publish(Session::failed());
            SessionError::from(err)
        })
    }

    /// Processes events until the provider closes the stream.
    ///
    /// Each event is handled to completion before the next is read.
    /// Dropping the returned future deregisters the subscription.
    pub async fn run(&self, mut subscription: AuthSubscription) {
        while let Some(event) = subscription.next_event().await {
            self.handle_event(event).await;
        }
        tracing::debug!("auth-state stream closed");
    }

    /// Applies one auth-state event and returns the resulting session.
    pub async fn handle_event(&self, event: AuthEvent) -> Session {
        if self.current().phase().is_terminal() {
            tracing::warn!("ignoring auth-state event in terminal error phase");
            return self.current();
        }
        match event {
            AuthEvent::LoggedIn(principal) => self.authenticate(principal).await,
            AuthEvent::LoggedOut => self.publish(Session::unauthenticated()),
        }
        self.current()
    }

    /// Starts the provider's interactive sign-in.
    ///
    /// The session itself changes only when the provider reports the
    /// sign-in on the auth-state stream.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Provider`] when sign-in fails or is
    /// cancelled.
    pub async fn sign_in(&self) -> SessionResult<Principal> {
        let principal = self.provider.sign_in_interactive().await?;
        tracing::info!(uid = principal.uid(), "interactive sign-in completed");
        Ok(principal)
    }

    /// Signs out of the provider and clears the session.
    ///
    /// The session is cleared even when the provider call fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Provider`] when the provider call failed.
    pub async fn sign_out(&self) -> SessionResult<()> {
        let result = self.provider.sign_out().await;
        if !self.current().phase().is_terminal() {
            self.publish(Session::unauthenticated());
        }
        result.map_err(|err| {
            tracing::warn!(error = %err, "provider sign-out failed; local session cleared");
            SessionError::from(err)
        })
    }

    /// Returns the credential while the session is ready.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthenticated`] in every other phase.
    pub fn current_credential(&self) -> SessionResult<Credential> {
        self.state
            .borrow()
            .ready_credential()
            .cloned()
            .ok_or(SessionError::Unauthenticated)
    }

    async fn authenticate(&self, principal: Principal) {
        self.publish(Session::authenticating());
        let resolved = self.resolve(&principal).await.and_then(|(credential, role)| {
            Session::ready(principal.clone(), credential, role).map_err(SessionError::from)
        });
        match resolved {
            Ok(session) => {
                tracing::info!(
                    uid = principal.uid(),
                    role = session.role().as_str(),
                    "session ready"
                );
                self.publish(session);
            }
            Err(err) => self.force_logout(&principal, &err).await,
        }
    }

    async fn resolve(&self, principal: &Principal) -> SessionResult<(Credential, Role)> {
        let credential = self.provider.get_credential(principal).await?;
        let role = self.directory.lookup_role(&credential).await?;
        Ok((credential, role))
    }

    async fn force_logout(&self, principal: &Principal, err: &SessionError) {
        tracing::warn!(
            uid = principal.uid(),
            error = %err,
            "session resolution failed; forcing sign-out"
        );
        if let Err(sign_out_err) = self.provider.sign_out().await {
            tracing::warn!(error = %sign_out_err, "provider sign-out failed during forced logout");
        }
        self.publish(Session::unauthenticated());
    }

    fn publish(&self, next: Session) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            let (from, to) = (current.phase(), next.phase());
            if from != to && !from.can_transition_to(to) {
                tracing::warn!(
                    from = from.as_str(),
                    to = to.as_str(),
                    "rejected illegal session transition"
                );
                return false;
            }
            tracing::debug!(from = from.as_str(), to = to.as_str(), "session published");
            *current = next;
            true
        });
    }
}
