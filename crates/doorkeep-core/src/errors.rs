//! Unified error handling
//!
//! `AccessError` names every way a request can fail. Each variant belongs to one
//! [`ErrorClass`], which is all the transport boundary is allowed to reveal.

use crate::identifiers::IdentityId;
use crate::types::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse failure class surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Malformed or missing input; never retried
    Input,
    /// Caller lacks validity, scope, or role; also covers unknown keys
    Permission,
    /// Store or hashing failure
    Internal,
}

/// Password policy rule that was not met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordWeakness {
    /// Fewer than eight characters
    TooShort,
    /// No lowercase ASCII letter
    NoLowercase,
    /// No uppercase ASCII letter
    NoUppercase,
    /// No ASCII digit
    NoDigit,
    /// No character outside ASCII letters and digits
    NoSpecial,
}

impl fmt::Display for PasswordWeakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PasswordWeakness::TooShort => "password too short",
            PasswordWeakness::NoLowercase => "no lowercase character in password",
            PasswordWeakness::NoUppercase => "no uppercase character in password",
            PasswordWeakness::NoDigit => "no numeric character in password",
            PasswordWeakness::NoSpecial => "no special character in password",
        };
        f.write_str(msg)
    }
}

/// Repository failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// A unique column already holds the value
    #[error("Unique constraint violated on {field}")]
    Conflict {
        /// Offending column
        field: &'static str,
    },
    /// Backing medium could not be read
    #[error("Read failed: {0}")]
    ReadFailed(String),
    /// Backing medium could not be written
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Stored data could not be decoded
    #[error("Corrupt store: {0}")]
    Corrupt(String),
}

/// Password hashing failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// Stored hash string is not in a recognised format
    #[error("Malformed hash: {0}")]
    Malformed(String),
    /// Hasher misconfigured
    #[error("Hasher configuration error: {0}")]
    Config(String),
}

/// Every failure of an access-control operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// No API key or caller id was supplied or it did not resolve
    #[error("caller could not be resolved")]
    UnknownCaller,

    /// Caller has no active validity window
    #[error("caller {caller} is currently not valid")]
    NotValid {
        /// Caller identity
        caller: IdentityId,
    },

    /// Caller holds no scope of the required mode on the actor
    #[error("caller {caller} holds no {mode} scope on actor {actor}")]
    NoScope {
        /// Caller identity
        caller: IdentityId,
        /// Target actor
        actor: IdentityId,
        /// Required mode
        mode: Mode,
    },

    /// Caller's role does not allow the operation
    #[error("caller {caller} lacks the {required} role")]
    WrongRole {
        /// Caller identity
        caller: IdentityId,
        /// Role the operation requires
        required: &'static str,
    },

    /// Health target is missing or not an actor
    #[error("identity {0} is not an actor")]
    NotAnActor(IdentityId),

    /// Health timeout was not positive
    #[error("timeout must be larger than 0, got {0}")]
    InvalidTimeout(i64),

    /// Role name not recognised
    #[error("unknown role: {0}")]
    InvalidRole(String),

    /// Mode name not recognised
    #[error("unknown mode: {0}")]
    InvalidMode(String),

    /// Password fails the strength policy
    #[error("weak password: {0}")]
    WeakPassword(PasswordWeakness),

    /// Identity referenced by id does not exist
    #[error("identity {0} not found")]
    IdentityNotFound(IdentityId),

    /// Required request field absent
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Identifier could not be parsed
    #[error("malformed identifier for {field}: {value:?}")]
    MalformedId {
        /// Field name
        field: &'static str,
        /// Raw value
        value: String,
    },

    /// Timestamp could not be parsed
    #[error("malformed timestamp for {field}: {value:?}")]
    MalformedTimestamp {
        /// Field name
        field: &'static str,
        /// Raw value
        value: String,
    },

    /// Integer field could not be parsed
    #[error("malformed integer for {field}: {value:?}")]
    MalformedInteger {
        /// Field name
        field: &'static str,
        /// Raw value
        value: String,
    },

    /// Open pulse length out of range
    #[error("open pulse must be positive and shorter than one minute, got {millis}ms")]
    InvalidPulse {
        /// Requested length
        millis: i64,
    },

    /// Repository failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Hashing failure
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl AccessError {
    /// Failure class visible at the boundary
    pub fn class(&self) -> ErrorClass {
        match self {
            AccessError::UnknownCaller
            | AccessError::NotValid { .. }
            | AccessError::NoScope { .. }
            | AccessError::WrongRole { .. } => ErrorClass::Permission,
            AccessError::NotAnActor(_)
            | AccessError::InvalidTimeout(_)
            | AccessError::InvalidRole(_)
            | AccessError::InvalidMode(_)
            | AccessError::WeakPassword(_)
            | AccessError::IdentityNotFound(_)
            | AccessError::MissingField(_)
            | AccessError::MalformedId { .. }
            | AccessError::MalformedTimestamp { .. }
            | AccessError::MalformedInteger { .. }
            | AccessError::InvalidPulse { .. } => ErrorClass::Input,
            AccessError::Storage(StorageError::Conflict { .. }) => ErrorClass::Input,
            AccessError::Storage(_) | AccessError::Hash(_) => ErrorClass::Internal,
        }
    }

    /// Whether this is a permission failure
    pub fn is_permission(&self) -> bool {
        self.class() == ErrorClass::Permission
    }
}

/// Standard Result type for access operations
pub type AccessResult<T> = std::result::Result<T, AccessError>;
