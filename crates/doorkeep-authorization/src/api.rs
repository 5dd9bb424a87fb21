//! Transport-neutral boundary
//!
//! Takes raw request fields exactly as a transport would hand them over,
//! parses them, resolves the caller, and runs the operation. Failures leave as
//! an [`ApiError`] carrying only the error class and a message that is safe to
//! show: permission failures all read the same, so an unknown key, a missing
//! scope, and a nonexistent actor cannot be told apart.

use crate::credentials::CredentialStore;
use crate::orchestrator::{AccessOrchestrator, StateView};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use doorkeep_core::{AccessError, AccessResult, ErrorClass, IdentityId, Mode, Role, Timestamp};
use serde::Serialize;
use std::str::FromStr;

const PERMISSION_MESSAGE: &str = "permission error";
const INTERNAL_MESSAGE: &str = "internal error";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error as seen by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{class:?}: {message}")]
pub struct ApiError {
    /// Failure class
    pub class: ErrorClass,
    /// Caller-safe message
    pub message: String,
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        let message = match err.class() {
            ErrorClass::Input => err.to_string(),
            ErrorClass::Permission => PERMISSION_MESSAGE.to_string(),
            ErrorClass::Internal => {
                tracing::error!(error = %err, "request failed internally");
                INTERNAL_MESSAGE.to_string()
            }
        };
        Self {
            class: err.class(),
            message,
        }
    }
}

/// Empty success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Always `true`
    pub ok: bool,
}

impl Ack {
    fn ok() -> Self {
        Self { ok: true }
    }
}

/// Result of `getState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateResponse {
    /// Whether the actor is open
    pub state: bool,
}

/// Result of `actorHealth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Whether the actor polled recently enough
    pub health: bool,
}

/// Result of `addUser`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUserResponse {
    /// New identity id
    pub id: IdentityId,
    /// Raw API key, shown once
    pub api_key: String,
    /// Whether a password was stored
    pub password_set: bool,
}

/// Result of `regenerateApiKey`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyResponse {
    /// New raw API key
    pub api_key: String,
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> AccessResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AccessError::MissingField(field)),
    }
}

fn parse_id(field: &'static str, raw: &str) -> AccessResult<IdentityId> {
    IdentityId::from_str(raw).map_err(|_| AccessError::MalformedId {
        field,
        value: raw.to_string(),
    })
}

/// Parse an optional ISO-8601 instant.
///
/// RFC 3339 values keep their offset; values without one are read as UTC,
/// and a bare date means midnight UTC. Absent or blank input is an open bound.
pub fn parse_timestamp(field: &'static str, raw: Option<&str>) -> AccessResult<Option<Timestamp>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| AccessError::MalformedTimestamp {
            field,
            value: raw.to_string(),
        })
}

/// Boundary over an [`AccessOrchestrator`]
#[derive(Debug, Clone)]
pub struct AccessApi {
    orchestrator: AccessOrchestrator,
}

impl AccessApi {
    /// Boundary over `orchestrator`
    pub fn new(orchestrator: AccessOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Underlying orchestrator
    pub fn orchestrator(&self) -> &AccessOrchestrator {
        &self.orchestrator
    }

    fn credentials(&self) -> &CredentialStore {
        self.orchestrator.credentials()
    }

    async fn caller(&self, raw_api_key: &str) -> AccessResult<IdentityId> {
        self.credentials()
            .resolve_identity(raw_api_key)
            .await?
            .ok_or(AccessError::UnknownCaller)
    }

    async fn caller_with_role(
        &self,
        raw_api_key: &str,
        role: Role,
    ) -> AccessResult<IdentityId> {
        let caller = self.caller(raw_api_key).await?;
        if self.credentials().role_of(caller).await? == Some(role) {
            Ok(caller)
        } else {
            tracing::debug!(caller = %caller, required = %role, "denied: wrong role");
            Err(AccessError::WrongRole {
                caller,
                required: role.as_str(),
            })
        }
    }

    /// `setState`: open an actor for one pulse
    pub async fn set_state(
        &self,
        api_key: Option<&str>,
        actor_id: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let key = required("api-key", api_key)?;
        let actor = parse_id("actor-id", required("actor-id", actor_id)?)?;
        let caller = self.caller(key).await?;
        self.orchestrator.set_state(actor, caller).await?;
        Ok(Ack::ok())
    }

    /// `getState`: whether an actor is open
    pub async fn get_state(
        &self,
        api_key: Option<&str>,
        actor_id: Option<&str>,
    ) -> Result<StateResponse, ApiError> {
        let key = required("api-key", api_key)?;
        let actor = parse_id("actor-id", required("actor-id", actor_id)?)?;
        let caller = self.credentials().resolve_identity(key).await?;
        match self.orchestrator.get_state(actor, caller).await? {
            StateView::Open => Ok(StateResponse { state: true }),
            StateView::Closed => Ok(StateResponse { state: false }),
            StateView::NoPermission => Err(AccessError::NoScope {
                caller: caller.unwrap_or(actor),
                actor,
                mode: Mode::Read,
            }
            .into()),
        }
    }

    /// `actorHealth`: liveness of an actor, for maintenance callers
    pub async fn actor_health(
        &self,
        api_key: Option<&str>,
        actor_id: Option<&str>,
        timeout_secs: Option<&str>,
    ) -> Result<HealthResponse, ApiError> {
        let key = required("api-key", api_key)?;
        let actor = parse_id("actor-id", required("actor-id", actor_id)?)?;
        let raw_timeout = required("timeout", timeout_secs)?;
        let timeout = raw_timeout
            .parse::<i64>()
            .map_err(|_| AccessError::MalformedInteger {
                field: "timeout",
                value: raw_timeout.to_string(),
            })?;
        self.caller_with_role(key, Role::Maintenance).await?;
        let health = self.orchestrator.health_check(actor, timeout).await?;
        Ok(HealthResponse { health })
    }

    /// `addUser`: create an identity, admin only
    pub async fn add_user(
        &self,
        api_key: Option<&str>,
        name: Option<&str>,
        role: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<NewUserResponse, ApiError> {
        let key = required("api-key", api_key)?;
        let name = required("name", name)?;
        let role = Role::from_str(required("role", role)?)?;
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let password = password.filter(|p| !p.is_empty());
        let admin = self.caller_with_role(key, Role::Admin).await?;
        let created = self
            .credentials()
            .create_identity(name, role, email, password)
            .await?;
        tracing::info!(admin = %admin, id = %created.id, %role, "user added");
        Ok(NewUserResponse {
            id: created.id,
            api_key: created.api_key,
            password_set: created.password_set,
        })
    }

    /// `addScope`: grant a mode on an actor, admin only
    pub async fn add_scope(
        &self,
        api_key: Option<&str>,
        grantor_id: Option<&str>,
        actor_id: Option<&str>,
        mode: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let key = required("api-key", api_key)?;
        let grantor = parse_id("grantor-id", required("grantor-id", grantor_id)?)?;
        let actor = parse_id("actor-id", required("actor-id", actor_id)?)?;
        let mode = Mode::from_str(required("mode", mode)?)?;
        self.caller_with_role(key, Role::Admin).await?;
        self.orchestrator.scopes().grant(grantor, actor, mode).await?;
        Ok(Ack::ok())
    }

    /// `addValid`: grant a validity window, admin only
    pub async fn add_valid(
        &self,
        api_key: Option<&str>,
        subject_id: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Ack, ApiError> {
        let key = required("api-key", api_key)?;
        let subject = parse_id("subject-id", required("subject-id", subject_id)?)?;
        let start = parse_timestamp("start", start)?;
        let end = parse_timestamp("end", end)?;
        self.caller_with_role(key, Role::Admin).await?;
        self.orchestrator.validity().grant(subject, start, end).await?;
        Ok(Ack::ok())
    }

    /// `regenerateApiKey`: replace the caller's own key
    pub async fn regenerate_api_key(
        &self,
        api_key: Option<&str>,
    ) -> Result<ApiKeyResponse, ApiError> {
        let key = required("api-key", api_key)?;
        let caller = self.caller(key).await?;
        let api_key = self.credentials().regenerate_api_key(caller).await?;
        Ok(ApiKeyResponse { api_key })
    }
}
