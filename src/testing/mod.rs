use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::database::{ConnectionFactory, DatabaseError, TenantConfig, TenantConfigStore};

/// In-memory tenant registry that counts lookups
#[derive(Default)]
pub struct MemoryConfigStore {
    configs: Mutex<HashMap<String, TenantConfig>>,
    unavailable: AtomicBool,
    find_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn insert(&self, config: TenantConfig) {
        self.configs.lock().unwrap().insert(config.name.clone(), config);
    }

    /// Make every query fail as if the system database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TenantConfigStore for MemoryConfigStore {
    async fn find_config(&self, tenant_name: &str) -> Result<Option<TenantConfig>, DatabaseError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.configs.lock().unwrap().get(tenant_name).cloned())
    }

    async fn list_all(&self) -> Result<Vec<TenantConfig>, DatabaseError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut configs: Vec<TenantConfig> = self.configs.lock().unwrap().values().cloned().collect();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }
}

/// What `CountingFactory` hands out instead of a real pool
#[derive(Debug)]
pub struct FakeSource {
    pub serial: usize,
    pub connection_string: String,
}

/// Connection factory double with build/close counters, optional latency and
/// failures keyed on a substring of the connection string.
#[derive(Default)]
pub struct CountingFactory {
    builds: AtomicUsize,
    closes: AtomicUsize,
    delay: Duration,
    delays: HashMap<String, Duration>,
    failing: Mutex<Vec<String>>,
}

impl CountingFactory {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_for(mut self, needle: &str, delay: Duration) -> Self {
        self.delays.insert(needle.to_string(), delay);
        self
    }

    pub fn failing_for(self, needle: &str) -> Self {
        self.failing.lock().unwrap().push(needle.to_string());
        self
    }

    pub fn recover(&self, needle: &str) {
        self.failing.lock().unwrap().retain(|n| n != needle);
    }

    /// Build attempts, successful or not
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for CountingFactory {
    type Source = Arc<FakeSource>;

    async fn build(&self, connection_string: Option<&str>) -> Result<Arc<FakeSource>, DatabaseError> {
        let serial = self.builds.fetch_add(1, Ordering::SeqCst);
        let connection_string = connection_string.unwrap_or("system").to_string();

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| connection_string.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fails = self
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|needle| connection_string.contains(needle.as_str()));
        if fails {
            return Err(DatabaseError::ConnectionBuild {
                target: connection_string,
                source: sqlx::Error::PoolTimedOut,
            });
        }

        Ok(Arc::new(FakeSource {
            serial,
            connection_string,
        }))
    }

    async fn close(&self, _source: &Arc<FakeSource>) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
