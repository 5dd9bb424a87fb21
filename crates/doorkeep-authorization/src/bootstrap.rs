//! Seed accounts
//!
//! Converges the store on one admin and one maintenance account under reserved
//! names. Safe to run at every start.

use crate::credentials::CredentialStore;
use doorkeep_core::{AccessResult, IdentityId, Role};
use serde::Serialize;

/// Reserved name of the seed admin account
pub const BUILTIN_ADMIN_NAME: &str = "_builtin_admin";

/// Reserved name of the seed maintenance account
pub const BUILTIN_MAINTENANCE_NAME: &str = "_builtin_maintenance";

const SEEDS: [(&str, Role); 2] = [
    (BUILTIN_ADMIN_NAME, Role::Admin),
    (BUILTIN_MAINTENANCE_NAME, Role::Maintenance),
];

/// A seed account created by this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeededAccount {
    /// Reserved name
    pub name: &'static str,
    /// Role of the account
    pub role: Role,
    /// New identity id
    pub id: IdentityId,
    /// Raw API key, shown this once
    pub api_key: String,
}

/// Create whichever seed accounts are missing.
///
/// Returns only the accounts created now; an empty list means the store was
/// already converged. A reserved name held by an identity of another role is
/// left alone and reported in the log.
pub async fn ensure_builtin_accounts(
    credentials: &CredentialStore,
) -> AccessResult<Vec<SeededAccount>> {
    let mut created = Vec::new();
    for (name, role) in SEEDS {
        if let Some(existing) = credentials.find_by_name(name).await? {
            if existing.role != role {
                tracing::warn!(
                    name,
                    expected = %role,
                    found = %existing.role,
                    "reserved account exists with unexpected role"
                );
            }
            continue;
        }
        let identity = credentials.create_identity(name, role, None, None).await?;
        tracing::info!(name, id = %identity.id, "seed account created");
        created.push(SeededAccount {
            name,
            role,
            id: identity.id,
            api_key: identity.api_key,
        });
    }
    Ok(created)
}
