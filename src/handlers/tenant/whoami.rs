// handlers/tenant/whoami.rs - GET /api/tenant/whoami handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::tenant::TenantContext;

/// Which tenant this request is routed to, and whether it was chosen by the caller
pub async fn tenant_whoami(State(state): State<AppState>) -> ApiResult<Value> {
    let tenant = state.tenants.current_tenant()?;

    Ok(ApiResponse::success(json!({
        "tenant": tenant,
        "bound": TenantContext::current().is_some(),
        "cached": state.registry().is_cached(tenant.as_str()),
    })))
}
