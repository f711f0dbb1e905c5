use std::sync::Arc;

use super::error::TenantError;
use super::id::TenantId;
use super::registry::TenantConnectionRegistry;
use super::resolver::CurrentTenantResolver;
use crate::database::{ConnectionFactory, TenantConfigStore};

/// Entry point for data access: which tenant is this, and which pool serves it
pub struct TenantRouter<S, F: ConnectionFactory> {
    resolver: Arc<dyn CurrentTenantResolver>,
    registry: Arc<TenantConnectionRegistry<S, F>>,
}

impl<S, F> TenantRouter<S, F>
where
    S: TenantConfigStore,
    F: ConnectionFactory,
{
    pub fn new(resolver: Arc<dyn CurrentTenantResolver>, registry: Arc<TenantConnectionRegistry<S, F>>) -> Self {
        Self { resolver, registry }
    }

    pub fn resolver(&self) -> &dyn CurrentTenantResolver {
        self.resolver.as_ref()
    }

    pub fn registry(&self) -> &Arc<TenantConnectionRegistry<S, F>> {
        &self.registry
    }

    pub fn current_tenant(&self) -> Result<TenantId, TenantError> {
        self.resolver.try_resolve_current_tenant()
    }

    /// Pool for the tenant bound to the calling unit of work
    pub async fn current_source(&self) -> Result<F::Source, TenantError> {
        let tenant = self.current_tenant()?;
        self.registry.get(tenant.as_str()).await
    }
}

impl<S, F: ConnectionFactory> Clone for TenantRouter<S, F> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            registry: self.registry.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ConnectionTemplate, TenantConfig};
    use crate::tenant::{ContextTenantResolver, TenantContext};
    use crate::testing::{CountingFactory, MemoryConfigStore};

    fn id(name: &str) -> TenantId {
        TenantId::new(name).unwrap()
    }

    async fn router(require_binding: bool) -> TenantRouter<MemoryConfigStore, CountingFactory> {
        let store = MemoryConfigStore::default();
        store.insert(TenantConfig::new("acme", "tenant_acme"));
        store.insert(TenantConfig::new("globex", "tenant_globex"));

        let factory = CountingFactory::default();
        let system = factory.build(None).await.unwrap();

        let template = ConnectionTemplate::parse("postgres://localhost:5432/catering_main").unwrap();
        let registry = Arc::new(TenantConnectionRegistry::new(store, factory, template));
        registry.seed("default", system);

        let resolver = ContextTenantResolver::new(id("default")).require_binding(require_binding);
        TenantRouter::new(Arc::new(resolver), registry)
    }

    #[tokio::test]
    async fn walks_through_a_request_lifecycle() {
        let router = router(false).await;

        TenantContext::scope(None, async {
            assert_eq!(router.current_tenant().unwrap(), id("default"));
            let system = router.current_source().await.unwrap();
            assert_eq!(system.connection_string, "system");

            TenantContext::bind(id("acme"));
            assert_eq!(router.current_tenant().unwrap(), id("acme"));
            let acme = router.current_source().await.unwrap();
            assert_eq!(acme.connection_string, "postgres://localhost:5432/tenant_acme");

            let again = router.registry().get("acme").await.unwrap();
            assert!(Arc::ptr_eq(&acme, &again));

            assert!(matches!(
                router.registry().get("initech").await,
                Err(TenantError::UnknownTenant(_))
            ));

            TenantContext::clear();
            assert_eq!(router.current_tenant().unwrap(), id("default"));
        })
        .await;
    }

    #[tokio::test]
    async fn unknown_bound_tenant_does_not_fall_back() {
        let router = router(false).await;

        let result = TenantContext::scope(Some(id("initech")), router.current_source()).await;
        assert!(matches!(result, Err(TenantError::UnknownTenant(ref t)) if t == "initech"));
    }

    #[tokio::test]
    async fn strict_router_refuses_unbound_work() {
        let router = router(true).await;

        let result = TenantContext::scope(None, router.current_source()).await;
        assert!(matches!(result, Err(TenantError::Unbound)));

        let bound = TenantContext::scope(Some(id("globex")), router.current_source()).await;
        assert!(bound.is_ok());

        // Naming the default tenant does not reach the system source
        let reserved = TenantContext::scope(Some(id("default")), router.current_source()).await;
        assert!(matches!(reserved, Err(TenantError::Reserved(_))));
    }
}
