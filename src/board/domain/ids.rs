//! Identifier types for board records.
//!
//! Identifiers are assigned by the backend and treated as opaque strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a backend-assigned identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as `str`.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

backend_id!(
    /// Identifier of a task record.
    TaskId
);

backend_id!(
    /// Identifier of the project a task belongs to.
    ProjectId
);

backend_id!(
    /// Identity provider user identifier, as stored by the backend.
    UserId
);

backend_id!(
    /// Identifier of a task comment.
    CommentId
);
