// handlers/root/tenant/warmup.rs - POST /api/root/tenant/warmup handler

use axum::extract::State;
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Build every missing tenant pool; per-tenant failures are listed, not fatal
pub async fn tenant_warmup(State(state): State<AppState>) -> ApiResult<Value> {
    let report = state.registry().get_all().await?;

    let mut ready: Vec<String> = report.ready.into_keys().collect();
    ready.sort();

    let failed: Map<String, Value> = report
        .failed
        .into_iter()
        .map(|(name, e)| {
            let message = ApiError::from(e).message().to_string();
            (name, Value::String(message))
        })
        .collect();

    Ok(ApiResponse::success(json!({
        "ready": ready,
        "failed": failed,
    })))
}
