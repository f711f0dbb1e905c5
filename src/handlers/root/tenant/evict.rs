// handlers/root/tenant/evict.rs - DELETE /api/root/tenant/:name/pool handler

use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Close the cached pool so the next request rebuilds it from the current config
pub async fn tenant_evict(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Value> {
    let evicted = state.registry().invalidate(&name).await;

    Ok(ApiResponse::success(json!({
        "tenant": name,
        "evicted": evicted,
    })))
}
