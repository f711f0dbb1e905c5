use anyhow::Context;
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use std::sync::Arc;

use crate::config::{AppConfig, DatabaseConfig, TenancyConfig};
use crate::database::{ConnectionFactory, PgConnectionFactory, PgTenantConfigStore};
use crate::error::ApiError;
use crate::tenant::{ContextTenantResolver, TenantConnectionRegistry, TenantRouter};

pub type PgTenantRegistry = TenantConnectionRegistry<PgTenantConfigStore, PgConnectionFactory>;
pub type PgTenantRouter = TenantRouter<PgTenantConfigStore, PgConnectionFactory>;

/// Shared state for handlers and the CLI
#[derive(Clone)]
pub struct AppState {
    pub tenants: PgTenantRouter,
    pub system_pool: PgPool,
}

impl AppState {
    /// Connect to the system database and wire the tenant registry around it
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let factory = PgConnectionFactory::from_config(&config.database)
            .context("invalid database configuration")?;
        let system_pool = factory
            .build(None)
            .await
            .context("failed to connect to the system database")?;

        Self::assemble(factory, &config.tenancy, system_pool)
    }

    /// Wire the tenant registry around an existing system pool.
    /// The system pool doubles as the default tenant's source.
    pub fn with_system_pool(
        database: &DatabaseConfig,
        tenancy: &TenancyConfig,
        system_pool: PgPool,
    ) -> anyhow::Result<Self> {
        let factory = PgConnectionFactory::from_config(database).context("invalid database configuration")?;
        Self::assemble(factory, tenancy, system_pool)
    }

    fn assemble(factory: PgConnectionFactory, tenancy: &TenancyConfig, system_pool: PgPool) -> anyhow::Result<Self> {
        let resolver = ContextTenantResolver::from_config(tenancy)?;
        let template = factory.template().clone();
        let store = PgTenantConfigStore::new(system_pool.clone());
        let registry = Arc::new(TenantConnectionRegistry::new(store, factory, template));
        registry.seed(resolver.default_tenant().as_str(), system_pool.clone());

        Ok(Self {
            tenants: TenantRouter::new(Arc::new(resolver), registry),
            system_pool,
        })
    }

    pub fn registry(&self) -> &Arc<PgTenantRegistry> {
        self.tenants.registry()
    }
}

/// Pool of the tenant bound to the current request
#[derive(Clone)]
pub struct TenantPool(pub PgPool);

#[axum::async_trait]
impl FromRequestParts<AppState> for TenantPool {
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let pool = state.tenants.current_source().await?;
        Ok(TenantPool(pool))
    }
}
