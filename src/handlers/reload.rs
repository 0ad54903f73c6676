use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub tools: usize,
    pub vocabulary: usize,
    pub catalog_fingerprint: String,
}

/// POST /reload - Re-read `TOOLS_PATH` and swap in a rebuilt index.
///
/// Searches keep hitting the previous index until the swap; a failed reload
/// leaves it in place.
pub async fn reload_handler(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>> {
    let worker_state = Arc::clone(&state);
    let snapshot = tokio::task::spawn_blocking(move || worker_state.reload_catalog())
        .await
        .map_err(|e| AppError::CatalogError(format!("Reload task join error: {}", e)))?
        .inspect_err(|e| tracing::warn!(error = %e, "Catalog reload failed"))?;

    metrics::counter!("catalog_reloads_total").increment(1);

    Ok(Json(ReloadResponse {
        status: "reloaded",
        tools: snapshot.catalog.len(),
        vocabulary: snapshot.index.vocabulary_size(),
        catalog_fingerprint: snapshot.catalog.fingerprint(),
    }))
}
