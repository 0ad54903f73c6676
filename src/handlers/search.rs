//! Tool discovery over HTTP.
//!
//! Thin wrapper around the configured [`SelectionStrategy`]: validates the
//! request, turns the optional allow-list into a set, and reports latency.

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::strategy::ToolMatch;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Natural language description of the task
    pub query: String,
    /// Number of results to rank (default from `DEFAULT_LIMIT`)
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restrict results to these tool names. Applied after ranking.
    #[serde(default)]
    pub available_tools: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ToolMatch>,
    pub strategy: String,
}

/// POST /search - Rank tools for a natural language query.
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start_time = std::time::Instant::now();

    if request.query.is_empty() {
        return Err(AppError::ValidationError(
            "Query cannot be empty".to_string(),
        ));
    }

    let limit = request.limit.unwrap_or(state.config.default_limit);
    if limit == 0 {
        return Err(AppError::ValidationError(
            "limit must be at least 1".to_string(),
        ));
    }
    if limit > state.config.max_limit {
        return Err(AppError::ValidationError(format!(
            "limit must be at most {}",
            state.config.max_limit
        )));
    }

    let available: Option<HashSet<String>> =
        request.available_tools.map(|names| names.into_iter().collect());

    let results = state
        .strategy
        .select(&request.query, available.as_ref(), Some(limit))
        .await?;

    let total_time = start_time.elapsed();
    tracing::info!(
        query = %request.query,
        limit,
        filtered = available.is_some(),
        returned = results.len(),
        strategy = state.strategy.name(),
        total_ms = total_time.as_millis() as u64,
        "Search completed"
    );

    metrics::counter!("search_requests_total", "strategy" => state.strategy.name().to_string())
        .increment(1);
    metrics::histogram!("search_latency_ms").record(total_time.as_secs_f64() * 1000.0);

    Ok(Json(SearchResponse {
        results,
        strategy: state.strategy.name().to_string(),
    }))
}
