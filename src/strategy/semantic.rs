//! Client for a remote semantic search service.
//!
//! The remote side exposes `POST /search` taking `{query, top_k}` and
//! answering `{results: [{name, score, description?}]}`, ranked best first.
//! Retries and backoff are the transport's business; this client makes one
//! request per call and reports any failure as `AppError::StrategyError`.

use crate::error::{AppError, Result};
use crate::strategy::{
    retain_available, CatalogHandle, SelectionStrategy, ToolMatch, DEFAULT_SELECT_LIMIT,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct RemoteSearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
struct RemoteSearchResponse {
    results: Vec<RemoteSearchResult>,
}

#[derive(Debug, Deserialize)]
struct RemoteSearchResult {
    name: String,
    score: f64,
    #[serde(default)]
    description: Option<String>,
}

pub struct SemanticStrategy {
    client: reqwest::Client,
    search_url: String,
    /// Fills in descriptions the remote side leaves out
    catalog: Option<CatalogHandle>,
    closed: AtomicBool,
}

impl SemanticStrategy {
    /// Create a client for the service at `base_url` (the `/search` path is
    /// appended).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
            catalog: None,
            closed: AtomicBool::new(false),
        })
    }

    pub fn with_catalog(mut self, catalog: CatalogHandle) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    fn describe(&self, name: &str) -> String {
        self.catalog
            .as_ref()
            .and_then(|handle| handle.load().catalog.get(name).map(|t| t.description.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl SelectionStrategy for SemanticStrategy {
    fn name(&self) -> &str {
        "semantic"
    }

    async fn select(
        &self,
        query: &str,
        available_tools: Option<&HashSet<String>>,
        limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::StrategyError(
                "Semantic strategy has been cleaned up".to_string(),
            ));
        }

        let top_k = limit.unwrap_or(DEFAULT_SELECT_LIMIT);
        if top_k == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.search_url)
            .json(&RemoteSearchRequest { query, top_k })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StrategyError(format!(
                "Remote search returned {}: {}",
                status, body
            )));
        }

        let body: RemoteSearchResponse = response.json().await?;

        let ranked: Vec<ToolMatch> = body
            .results
            .into_iter()
            .take(top_k)
            .map(|r| {
                let description = r.description.unwrap_or_else(|| self.describe(&r.name));
                ToolMatch {
                    name: r.name,
                    description,
                    score: r.score,
                }
            })
            .collect();

        tracing::debug!(results = ranked.len(), "Remote semantic search completed");

        Ok(retain_available(ranked, available_tools))
    }

    async fn cleanup(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!(url = %self.search_url, "Semantic strategy closed");
        }
        Ok(())
    }
}
