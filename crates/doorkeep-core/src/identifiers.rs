//! Identifier types for stored records
//!
//! Every stored row carries a UUID. The newtypes keep an identity id from being
//! passed where a scope id is expected, which matters because scopes and usage
//! records reference identities in two different roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a fresh random identifier
            pub fn new_random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create from a UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered principal (user, actor, or service account)
    IdentityId
);

record_id!(
    /// Identifier of a validity window row
    ValidityId
);

record_id!(
    /// Identifier of a scope grant row
    ScopeId
);

record_id!(
    /// Identifier of an actor open-state interval
    StateId
);

record_id!(
    /// Identifier of a usage record
    UsageId
);

impl IdentityId {
    /// The compact 32-character hex form handed out to clients
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}
