//! Session record and its lifecycle phases.

use super::{Credential, Principal, Role, SessionDomainError};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No identity provider event has been processed yet.
    Initializing,
    /// A sign-in was reported; credential and role are being resolved.
    Authenticating,
    /// Identity, credential and role are all available.
    Ready,
    /// No one is signed in.
    Unauthenticated,
    /// The identity provider subscription could not be established.
    Error,
}

impl SessionPhase {
    /// Returns the canonical representation used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Unauthenticated => "unauthenticated",
            Self::Error => "error",
        }
    }

    /// Returns `true` when the phase admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns `true` when moving from `self` to `next` is permitted.
    ///
    /// [`SessionPhase::Error`] is entered only when the provider
    /// subscription fails and is never left. Staying in the same phase is
    /// not a transition and returns `false`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Authenticating | Self::Unauthenticated)
                | (Self::Authenticating, Self::Ready | Self::Unauthenticated)
                | (Self::Ready, Self::Authenticating | Self::Unauthenticated)
                | (Self::Unauthenticated, Self::Authenticating)
                | (
                    Self::Initializing
                        | Self::Authenticating
                        | Self::Ready
                        | Self::Unauthenticated,
                    Self::Error
                )
        )
    }
}

/// The current authenticated actor.
///
/// A granted role, an identity and a credential are present together, and
/// only while the phase is [`SessionPhase::Ready`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Principal>,
    credential: Option<Credential>,
    role: Role,
    phase: SessionPhase,
}

impl Session {
    /// Session before any provider event has been observed.
    #[must_use]
    pub const fn initializing() -> Self {
        Self::anonymous(Role::Unresolved, SessionPhase::Initializing)
    }

    /// Session while a reported sign-in is being resolved.
    #[must_use]
    pub const fn authenticating() -> Self {
        Self::anonymous(Role::Unresolved, SessionPhase::Authenticating)
    }

    /// Session after sign-out, a failed role lookup, or no sign-in at all.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self::anonymous(Role::None, SessionPhase::Unauthenticated)
    }

    /// Session after the provider subscription failed.
    #[must_use]
    pub const fn failed() -> Self {
        Self::anonymous(Role::None, SessionPhase::Error)
    }

    /// Fully resolved session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::UnresolvedRole`] unless `role` was
    /// granted by the backend.
    pub fn ready(
        identity: Principal,
        credential: Credential,
        role: Role,
    ) -> Result<Self, SessionDomainError> {
        if !role.is_granted() {
            return Err(SessionDomainError::UnresolvedRole(role));
        }
        Ok(Self {
            identity: Some(identity),
            credential: Some(credential),
            role,
            phase: SessionPhase::Ready,
        })
    }

    const fn anonymous(role: Role, phase: SessionPhase) -> Self {
        Self {
            identity: None,
            credential: None,
            role,
            phase,
        }
    }

    /// Returns the signed-in principal, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Principal> {
        self.identity.as_ref()
    }

    /// Returns the bearer credential, if any.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Returns the session role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Returns `true` when the session can authorize backend calls.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, SessionPhase::Ready)
    }

    /// Returns the credential only while the session is ready.
    #[must_use]
    pub const fn ready_credential(&self) -> Option<&Credential> {
        if self.is_ready() {
            self.credential.as_ref()
        } else {
            None
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}
