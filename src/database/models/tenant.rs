use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the system database `tenants` table.
///
/// Written by the provisioning flow; this crate only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TenantConfig {
    pub id: Uuid,
    pub name: String,
    pub database: String,
    /// Overrides the host of the shared connection template when set
    pub host: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TenantConfig {
    /// Active config with no host override, mostly useful for fixtures
    pub fn new(name: impl Into<String>, database: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            database: database.into(),
            host: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Inactive or soft-deleted rows are treated as unknown tenants
    pub fn is_routable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}
