use crate::errors::AccessError;
use crate::identifiers::IdentityId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flat role of an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Account kept for history but not usable
    Deactivated,
    /// May create identities and grant scopes and validity
    Admin,
    /// Controllable physical endpoint such as a door lock
    Actor,
    /// Human user
    User,
    /// Restricted human user
    Guest,
    /// Service account allowed to query actor health
    Maintenance,
}

impl Role {
    /// All roles in declaration order
    pub const ALL: [Role; 6] = [
        Role::Deactivated,
        Role::Admin,
        Role::Actor,
        Role::User,
        Role::Guest,
        Role::Maintenance,
    ];

    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Deactivated => "deactivated",
            Role::Admin => "admin",
            Role::Actor => "actor",
            Role::User => "user",
            Role::Guest => "guest",
            Role::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AccessError::InvalidRole(s.to_string()))
    }
}

/// Registered principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Row id
    pub id: IdentityId,
    /// Unique display name
    pub name: String,
    /// Role
    pub role: Role,
    /// Unique contact address, if any
    pub email: Option<String>,
    /// Salted slow hash of the password, if one was set
    pub credential_hash: Option<String>,
    /// Fast hash of the most recently issued raw API key
    pub api_key_hash: Option<String>,
    /// Creation instant
    pub created_at: Timestamp,
    /// Last mutation instant
    pub updated_at: Timestamp,
}

impl Identity {
    /// Whether this identity is an actor endpoint
    pub fn is_actor(&self) -> bool {
        matches!(self.role, Role::Actor)
    }
}
