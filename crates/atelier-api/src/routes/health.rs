use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the store backend and whether the upstream credentials are set.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let store = match state.store.list().await {
        Ok(_) => format!("{} (reachable)", state.store.backend()),
        Err(e) => {
            tracing::warn!(error = %e, "Thread store health check failed");
            format!("{} (unreachable)", state.store.backend())
        }
    };
    services.insert("store".to_string(), store);

    let credential = |present: bool| if present { "configured" } else { "missing" }.to_string();
    services.insert(
        "pollinations".to_string(),
        credential(state.config.pollinations_api_token.is_some()),
    );
    services.insert("bfl".to_string(), credential(state.config.bfl_api_key.is_some()));

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
