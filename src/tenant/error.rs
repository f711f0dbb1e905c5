use thiserror::Error;

use crate::database::DatabaseError;

/// Errors from tenant resolution and per-tenant connection routing
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Invalid tenant identifier: {0:?}")]
    InvalidIdentifier(String),

    /// No routable `tenants` row exists for this name. Never replaced by a fallback.
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    #[error("No tenant bound to the current request")]
    Unbound,

    /// The default tenant is the system database; strict routing refuses to bind it.
    #[error("Tenant '{0}' is reserved")]
    Reserved(String),

    #[error("Failed to build connection for tenant '{tenant}': {source}")]
    ConnectionBuild {
        tenant: String,
        #[source]
        source: DatabaseError,
    },

    #[error("Tenant configuration lookup failed: {0}")]
    Store(#[source] DatabaseError),
}
