#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catering_api_rust::database::{ConnectionFactory, DatabaseError, TenantConfig, TenantConfigStore};

/// Tenants held in memory in place of the system database
#[derive(Default)]
pub struct FixtureStore {
    configs: Mutex<HashMap<String, TenantConfig>>,
    pub lookups: AtomicUsize,
}

impl FixtureStore {
    pub fn with_tenants(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.add(TenantConfig::new(*name, format!("tenant_{}", name)));
        }
        store
    }

    pub fn add(&self, config: TenantConfig) {
        self.configs.lock().unwrap().insert(config.name.clone(), config);
    }
}

#[async_trait]
impl TenantConfigStore for FixtureStore {
    async fn find_config(&self, tenant_name: &str) -> Result<Option<TenantConfig>, DatabaseError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.configs.lock().unwrap().get(tenant_name).cloned())
    }

    async fn list_all(&self) -> Result<Vec<TenantConfig>, DatabaseError> {
        Ok(self.configs.lock().unwrap().values().cloned().collect())
    }
}

/// Stand-in for a pool: remembers the connection string it was built from
#[derive(Debug)]
pub struct FixturePool {
    pub url: String,
}

/// Factory that sleeps for `latency` per build and fails for databases in `unreachable`
#[derive(Default)]
pub struct FixtureFactory {
    pub builds: AtomicUsize,
    pub latency: Duration,
    pub unreachable: Vec<String>,
}

#[async_trait]
impl ConnectionFactory for FixtureFactory {
    type Source = Arc<FixturePool>;

    async fn build(&self, connection_string: Option<&str>) -> Result<Arc<FixturePool>, DatabaseError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let url = connection_string.unwrap_or("system").to_string();
        tokio::time::sleep(self.latency).await;

        if self.unreachable.iter().any(|db| url.ends_with(db.as_str())) {
            return Err(DatabaseError::ConnectionBuild {
                target: url,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(Arc::new(FixturePool { url }))
    }
}
