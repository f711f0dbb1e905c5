use async_trait::async_trait;
use sqlx::PgPool;

use super::error::DatabaseError;
use super::models::TenantConfig;

/// Read access to the tenant registry kept in the system database
#[async_trait]
pub trait TenantConfigStore: Send + Sync + 'static {
    /// Point lookup by tenant name. `None` means the tenant is unknown.
    async fn find_config(&self, tenant_name: &str) -> Result<Option<TenantConfig>, DatabaseError>;

    /// Every routable tenant, used for warm-up and listings
    async fn list_all(&self) -> Result<Vec<TenantConfig>, DatabaseError>;
}

/// `TenantConfigStore` backed by the `tenants` table
#[derive(Debug, Clone)]
pub struct PgTenantConfigStore {
    pool: PgPool,
}

impl PgTenantConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TenantConfigStore for PgTenantConfigStore {
    async fn find_config(&self, tenant_name: &str) -> Result<Option<TenantConfig>, DatabaseError> {
        let row = sqlx::query_as::<_, TenantConfig>(
            r#"
            SELECT id, name, database, host, is_active, created_at, updated_at, deleted_at
            FROM tenants
            WHERE name = $1
            AND is_active = true
            AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<TenantConfig>, DatabaseError> {
        let rows = sqlx::query_as::<_, TenantConfig>(
            r#"
            SELECT id, name, database, host, is_active, created_at, updated_at, deleted_at
            FROM tenants
            WHERE is_active = true
            AND deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
