use crate::errors::AccessError;
use crate::identifiers::{IdentityId, ScopeId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access mode carried by a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Placeholder granting nothing
    Unset,
    /// May query actor state
    Read,
    /// May open the actor
    Write,
}

impl Mode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Unset => "unset",
            Mode::Read => "read",
            Mode::Write => "write",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unset" => Ok(Mode::Unset),
            "read" => Ok(Mode::Read),
            "write" => Ok(Mode::Write),
            other => Err(AccessError::InvalidMode(other.to_string())),
        }
    }
}

/// Grant: `grantor_id` may perform `mode` on `actor_id`
///
/// Immutable once stored. Duplicates are harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Row id
    pub id: ScopeId,
    /// Permission holder
    pub grantor_id: IdentityId,
    /// Target actor
    pub actor_id: IdentityId,
    /// Granted mode
    pub mode: Mode,
    /// Creation instant
    pub created_at: Timestamp,
    /// Last mutation instant
    pub updated_at: Timestamp,
}

impl Scope {
    /// Whether this row grants `mode` on `actor` to `subject`
    pub fn grants(&self, subject: IdentityId, actor: IdentityId, mode: Mode) -> bool {
        self.grantor_id == subject && self.actor_id == actor && self.mode == mode
    }
}
