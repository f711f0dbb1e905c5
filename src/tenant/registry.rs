use futures::future::join_all;
use std::collections::HashMap;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::error::TenantError;
use crate::database::{ConnectionFactory, ConnectionTemplate, TenantConfig, TenantConfigStore};

/// One cache entry. An empty cell is a build in progress; a filled one is ready.
struct Entry<T> {
    cell: Arc<OnceCell<T>>,
    /// Seeded entries (the default tenant) are never evicted
    pinned: bool,
}

type Entries<T> = RwLock<HashMap<String, Entry<T>>>;

/// Lazily populated map of tenant name to pooled connection source.
///
/// Concurrent first requests for the same tenant share a single build; requests for
/// different tenants never wait on each other because the map lock is only held to
/// look up or insert an entry, never across an await. Failed or cancelled builds
/// leave nothing behind.
pub struct TenantConnectionRegistry<S, F: ConnectionFactory> {
    store: S,
    factory: F,
    template: ConnectionTemplate,
    entries: Entries<F::Source>,
}

/// Outcome of [`TenantConnectionRegistry::get_all`]
pub struct WarmupReport<T> {
    pub ready: HashMap<String, T>,
    pub failed: HashMap<String, TenantError>,
}

impl<T> Default for WarmupReport<T> {
    fn default() -> Self {
        Self {
            ready: HashMap::new(),
            failed: HashMap::new(),
        }
    }
}

impl<S, F> TenantConnectionRegistry<S, F>
where
    S: TenantConfigStore,
    F: ConnectionFactory,
{
    pub fn new(store: S, factory: F, template: ConnectionTemplate) -> Self {
        Self {
            store,
            factory,
            template,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Pooled source for `tenant_name`, built on first use and reused afterwards
    pub async fn get(&self, tenant_name: &str) -> Result<F::Source, TenantError> {
        self.get_or_build(tenant_name, || self.build_for(tenant_name)).await
    }

    /// Resolve and cache a source for every tenant in the store.
    ///
    /// Tenants are built concurrently and independently: one tenant failing does not
    /// stop the others. Only a failure to list the tenants fails the whole call.
    pub async fn get_all(&self) -> Result<WarmupReport<F::Source>, TenantError> {
        let configs = self.store.list_all().await.map_err(TenantError::Store)?;

        let results = join_all(configs.iter().filter(|c| c.is_routable()).map(|config| async move {
            let result = self
                .get_or_build(&config.name, || self.build_from_config(config))
                .await;
            (config.name.clone(), result)
        }))
        .await;

        let mut report = WarmupReport::default();
        for (name, result) in results {
            match result {
                Ok(source) => {
                    report.ready.insert(name, source);
                }
                Err(e) => {
                    warn!("Tenant warm-up failed for '{}': {}", name, e);
                    report.failed.insert(name, e);
                }
            }
        }

        info!(
            ready = report.ready.len(),
            failed = report.failed.len(),
            "Tenant warm-up finished"
        );
        Ok(report)
    }

    /// Register an already built source, typically the system pool for the default
    /// tenant. Returns false when the name is already registered; nothing is replaced.
    pub fn seed(&self, tenant_name: &str, source: F::Source) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(tenant_name) {
            return false;
        }
        entries.insert(
            tenant_name.to_string(),
            Entry {
                cell: Arc::new(OnceCell::from(source)),
                pinned: true,
            },
        );
        true
    }

    /// Drop and close the cached source so the next `get` rebuilds it from the
    /// current configuration. Callers still holding the old source see it closed.
    ///
    /// A build still in progress is left alone: its waiters would otherwise receive a
    /// source the map no longer tracks, and the next `get` would build a second one.
    pub async fn invalidate(&self, tenant_name: &str) -> bool {
        let evicted = {
            let mut entries = self.entries.write();
            match entries.get(tenant_name) {
                Some(entry) if entry.pinned => {
                    warn!("Refusing to evict pinned tenant source: {}", tenant_name);
                    return false;
                }
                Some(entry) if !entry.cell.initialized() => {
                    debug!("Tenant pool still building, not evicted: {}", tenant_name);
                    return false;
                }
                Some(_) => entries.remove(tenant_name),
                None => None,
            }
        };

        match evicted.and_then(|entry| entry.cell.get().cloned()) {
            Some(source) => {
                self.factory.close(&source).await;
                info!("Evicted tenant connection pool: {}", tenant_name);
                true
            }
            None => false,
        }
    }

    pub fn is_cached(&self, tenant_name: &str) -> bool {
        self.cached(tenant_name).is_some()
    }

    /// Names of tenants with a ready source, sorted
    pub fn cached_tenants(&self) -> Vec<String> {
        let entries = self.entries.read();
        let mut names: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.cell.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Close and remove every source, e.g. on shutdown
    pub async fn close_all(&self) {
        let drained: Vec<(String, Entry<F::Source>)> = {
            let mut entries = self.entries.write();
            entries.drain().collect()
        };

        for (name, entry) in drained {
            if let Some(source) = entry.cell.get() {
                self.factory.close(source).await;
                info!("Closed database pool: {}", name);
            }
        }
    }

    fn cached(&self, tenant_name: &str) -> Option<F::Source> {
        let entries = self.entries.read();
        entries.get(tenant_name).and_then(|entry| entry.cell.get().cloned())
    }

    async fn get_or_build<Fut>(
        &self,
        tenant_name: &str,
        build: impl FnOnce() -> Fut,
    ) -> Result<F::Source, TenantError>
    where
        Fut: Future<Output = Result<F::Source, TenantError>>,
    {
        // Fast path: shared lock, no I/O
        if let Some(source) = self.cached(tenant_name) {
            debug!("Tenant pool cache hit: {}", tenant_name);
            return Ok(source);
        }

        let attempt = {
            let mut entries = self.entries.write();
            let cell = entries
                .entry(tenant_name.to_string())
                .or_insert_with(|| Entry {
                    cell: Arc::new(OnceCell::new()),
                    pinned: false,
                })
                .cell
                .clone();
            BuildAttempt {
                entries: &self.entries,
                tenant_name,
                cell,
            }
        };

        // Only one caller runs `build` for this cell; the rest wait for its result.
        // Dropping `attempt` on any exit, including cancellation, cleans up an empty cell.
        let result = attempt.cell.get_or_try_init(build).await.cloned();
        result
    }

    async fn build_for(&self, tenant_name: &str) -> Result<F::Source, TenantError> {
        let config = self
            .store
            .find_config(tenant_name)
            .await
            .map_err(TenantError::Store)?
            .filter(TenantConfig::is_routable)
            .ok_or_else(|| {
                warn!("Unknown tenant requested: {}", tenant_name);
                TenantError::UnknownTenant(tenant_name.to_string())
            })?;

        self.build_from_config(&config).await
    }

    async fn build_from_config(&self, config: &TenantConfig) -> Result<F::Source, TenantError> {
        let connection_error = |source| TenantError::ConnectionBuild {
            tenant: config.name.clone(),
            source,
        };

        let connection_string = self
            .template
            .for_database_on(&config.database, config.host.as_deref())
            .map_err(connection_error)?;

        let source = self
            .factory
            .build(Some(&connection_string))
            .await
            .map_err(connection_error)?;

        info!("Tenant connection pool ready: {} ({})", config.name, config.database);
        Ok(source)
    }
}

/// A caller's claim on a cache cell while it builds or waits for the build.
///
/// When the last claim on a still-empty cell goes away, whether the build failed or
/// the caller was cancelled, the cell is removed so no dead key stays in the map.
struct BuildAttempt<'a, T> {
    entries: &'a Entries<T>,
    tenant_name: &'a str,
    cell: Arc<OnceCell<T>>,
}

impl<T> Drop for BuildAttempt<'_, T> {
    fn drop(&mut self) {
        if self.cell.initialized() {
            return;
        }

        let mut entries = self.entries.write();
        let abandoned = match entries.get(self.tenant_name) {
            // One reference held by the map, one by this attempt
            Some(entry) => Arc::ptr_eq(&entry.cell, &self.cell) && Arc::strong_count(&self.cell) == 2,
            None => false,
        };
        if abandoned {
            entries.remove(self.tenant_name);
        }
    }
}
