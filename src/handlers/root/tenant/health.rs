// handlers/root/tenant/health.rs - GET /api/root/tenant/:name/health handler

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn tenant_health(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Value> {
    let pool = state.registry().get(&name).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::from)?;

    Ok(ApiResponse::success(json!({
        "tenant": name,
        "database": "ok",
        "pool_size": pool.size(),
        "idle_connections": pool.num_idle(),
    })))
}
