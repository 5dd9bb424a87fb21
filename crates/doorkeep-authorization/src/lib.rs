//! Doorkeep Authorization
//!
//! The authorization and temporal-validity core of the door service. A request
//! resolves its caller from an API key, checks the caller's validity windows,
//! checks the scope registry for the required mode on the target actor, then
//! reads or writes actor state and records usage.
//!
//! ```text
//! ResolveCaller → CheckCallerValidity → CheckScope → {Mutate | Query} → RecordUsage
//! ```
//!
//! Components are thin wrappers over the effect traits in `doorkeep-core`, bundled
//! in [`AccessEffects`]. [`AccessOrchestrator`] composes them; [`AccessApi`] is the
//! transport-neutral boundary that parses raw request fields and folds every
//! failure into an input or permission error.

#![forbid(unsafe_code)]

pub mod api;
pub mod bootstrap;
pub mod credentials;
pub mod orchestrator;
pub mod scopes;
pub mod state;
pub mod usage;
pub mod validity;

mod effects;

#[cfg(test)]
mod test_support;

pub use api::{AccessApi, Ack, ApiError, ApiKeyResponse, HealthResponse, NewUserResponse, StateResponse};
pub use bootstrap::{ensure_builtin_accounts, SeededAccount, BUILTIN_ADMIN_NAME, BUILTIN_MAINTENANCE_NAME};
pub use credentials::{check_password_policy, CredentialStore, NewIdentity};
pub use effects::AccessEffects;
pub use orchestrator::{AccessOrchestrator, StateView};
pub use scopes::ScopeRegistry;
pub use state::StateStore;
pub use usage::UsageRecorder;
pub use validity::ValidityRegistry;
