mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use catering_api_rust::database::{ConnectionFactory, ConnectionTemplate};
use catering_api_rust::tenant::{
    ContextTenantResolver, CurrentTenantResolver, TenantConnectionRegistry, TenantContext, TenantError, TenantId,
    TenantRouter,
};
use common::{FixtureFactory, FixtureStore};

type Registry = TenantConnectionRegistry<FixtureStore, FixtureFactory>;

fn template() -> ConnectionTemplate {
    ConnectionTemplate::parse("postgres://caterer:pw@db.local:5432/catering_main?sslmode=require").unwrap()
}

fn id(name: &str) -> TenantId {
    TenantId::new(name).unwrap()
}

#[tokio::test]
async fn documented_request_scenario() {
    let registry: Arc<Registry> = Arc::new(TenantConnectionRegistry::new(
        FixtureStore::with_tenants(&["acme", "globex"]),
        FixtureFactory::default(),
        template(),
    ));
    let resolver = ContextTenantResolver::new(id("default"));

    TenantContext::scope(None, async {
        assert_eq!(resolver.resolve_current_tenant(), id("default"));

        TenantContext::bind(id("acme"));
        assert_eq!(resolver.resolve_current_tenant(), id("acme"));

        let first = registry.get("acme").await.unwrap();
        assert_eq!(first.url, "postgres://caterer:pw@db.local:5432/tenant_acme?sslmode=require");
        let second = registry.get("acme").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(matches!(registry.get("initech").await, Err(TenantError::UnknownTenant(_))));
        assert!(!registry.is_cached("initech"));

        TenantContext::clear();
        assert_eq!(resolver.resolve_current_tenant(), id("default"));
    })
    .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_requests_for_a_new_tenant_share_one_pool() {
    let factory = FixtureFactory {
        latency: Duration::from_millis(100),
        ..Default::default()
    };
    let registry: Arc<Registry> = Arc::new(TenantConnectionRegistry::new(
        FixtureStore::with_tenants(&["acme"]),
        factory,
        template(),
    ));
    let resolver: Arc<dyn CurrentTenantResolver> = Arc::new(ContextTenantResolver::new(id("default")));
    let router = TenantRouter::new(resolver, registry.clone());

    let mut handles = Vec::new();
    for _ in 0..64 {
        let router = router.clone();
        handles.push(tokio::spawn(TenantContext::scope(Some(id("acme")), async move {
            router.current_source().await
        })));
    }

    let mut pools = Vec::new();
    for handle in handles {
        pools.push(handle.await.unwrap().unwrap());
    }

    assert!(pools.iter().all(|p| Arc::ptr_eq(p, &pools[0])));
    assert_eq!(registry.store().lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn warmup_reports_each_tenant_independently() {
    let factory = FixtureFactory {
        unreachable: vec!["tenant_hooli?sslmode=require".to_string()],
        ..Default::default()
    };
    let registry: Registry = TenantConnectionRegistry::new(
        FixtureStore::with_tenants(&["acme", "globex", "hooli", "initech", "umbrella"]),
        factory,
        template(),
    );

    let report = registry.get_all().await.unwrap();

    let mut ready: Vec<_> = report.ready.keys().cloned().collect();
    ready.sort();
    assert_eq!(ready, vec!["acme", "globex", "initech", "umbrella"]);
    assert!(matches!(report.failed.get("hooli"), Some(TenantError::ConnectionBuild { .. })));

    // The failed tenant is retried on demand rather than remembered as broken
    assert!(registry.get("hooli").await.is_err());
    assert!(!registry.is_cached("hooli"));
}

#[tokio::test]
async fn default_tenant_is_served_by_the_system_source() {
    let factory = FixtureFactory::default();
    let system = factory.build(None).await.unwrap();
    let registry: Arc<Registry> = Arc::new(TenantConnectionRegistry::new(
        FixtureStore::with_tenants(&["acme"]),
        factory,
        template(),
    ));
    assert!(registry.seed("default", system.clone()));

    let router = TenantRouter::new(Arc::new(ContextTenantResolver::new(id("default"))), registry.clone());
    let served = TenantContext::scope(None, router.current_source()).await.unwrap();

    assert!(Arc::ptr_eq(&served, &system));
    assert_eq!(registry.store().lookups.load(Ordering::SeqCst), 0);
}
