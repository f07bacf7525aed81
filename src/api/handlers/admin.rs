use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::store_error;
use crate::api::response::{ApiError, JSend};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub node_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub entries_deleted: u64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        node_id: state.config.node.id.clone(),
        status: "healthy".to_string(),
    })
}

/// Drop all ephemeral state (for testing only). The durable token snapshot
/// is left in place; the next startup re-seeds from it.
pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let count = state.store.clear().map_err(store_error)?;
    tracing::warn!(entries = count, "Purged all ephemeral state");

    Ok(JSend::success(PurgeResponse {
        entries_deleted: count as u64,
    }))
}
