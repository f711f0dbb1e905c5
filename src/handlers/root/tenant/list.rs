// handlers/root/tenant/list.rs - GET /api/root/tenant handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::database::TenantConfigStore;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn tenant_list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let registry = state.registry();
    let configs = registry.store().list_all().await?;
    let cached = registry.cached_tenants();

    let tenants = configs
        .into_iter()
        .map(|config| {
            json!({
                "cached": cached.contains(&config.name),
                "id": config.id,
                "name": config.name,
                "database": config.database,
                "host": config.host,
                "created_at": config.created_at,
                "updated_at": config.updated_at,
            })
        })
        .collect();

    Ok(ApiResponse::success(tenants))
}
