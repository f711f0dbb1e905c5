use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{bind_tenant_middleware, require_operator_middleware, OperatorGuard, TenantBinder};
use crate::state::AppState;

/// Every route, behind the tenant binder; `/api/root/*` additionally behind the operator guard
pub fn router(state: AppState, binder: TenantBinder, guard: OperatorGuard) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health))
        .merge(tenant_routes())
        .merge(root_routes(guard))
        .layer(from_fn_with_state(binder, bind_tenant_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn tenant_routes() -> Router<AppState> {
    use handlers::tenant;

    Router::new()
        .route("/api/tenant/whoami", get(tenant::tenant_whoami))
        .route("/api/tenant/ping", get(tenant::tenant_ping))
}

fn root_routes(guard: OperatorGuard) -> Router<AppState> {
    use handlers::root;

    Router::new()
        .route("/api/root/tenant", get(root::tenant_list))
        .route("/api/root/tenant/warmup", post(root::tenant_warmup))
        .route("/api/root/tenant/:name/health", get(root::tenant_health))
        .route("/api/root/tenant/:name/pool", delete(root::tenant_evict))
        .route_layer(from_fn_with_state(guard, require_operator_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Catering API (Rust)",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "tenant": "/api/tenant/whoami, /api/tenant/ping (tenant from header or token)",
                "root": "/api/root/tenant[/:name/health|/:name/pool|/warmup] (operator token or localhost)",
            }
        }
    }))
}
