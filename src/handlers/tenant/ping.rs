// handlers/tenant/ping.rs - GET /api/tenant/ping handler

use axum::extract::State;
use serde_json::{json, Value};
use std::time::Instant;

use crate::database::DatabaseError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::{AppState, TenantPool};

/// Round trip to the current tenant's database
pub async fn tenant_ping(State(state): State<AppState>, TenantPool(pool): TenantPool) -> ApiResult<Value> {
    let tenant = state.tenants.current_tenant()?;

    let started = Instant::now();
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(ApiResponse::success(json!({
        "tenant": tenant,
        "database": "ok",
        "latency_ms": started.elapsed().as_millis() as u64,
    })))
}
