use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

const PROBE_SESSION: &str = "_health_check";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports the session store as "connected" when a probe load succeeds.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let storage = match state.store.load(PROBE_SESSION).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::warn!("Session store probe failed: {}", e);
            "disconnected"
        }
    };
    services.insert("storage".to_string(), storage.to_string());
    services.insert(
        "persistence".to_string(),
        if state.graph.has_persistence() { "enabled" } else { "disabled" }.to_string(),
    );

    let status = if storage == "connected" { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
