//! TF-IDF backed selection over the local tool catalog.

use crate::error::Result;
use crate::index::TfIdfIndex;
use crate::ingestion::ToolCatalog;
use crate::strategy::{retain_available, SelectionStrategy, ToolMatch, DEFAULT_SELECT_LIMIT};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// A catalog together with the index built from it. Always replaced whole.
#[derive(Debug, Default)]
pub struct IndexedCatalog {
    pub catalog: ToolCatalog,
    pub index: TfIdfIndex,
}

impl IndexedCatalog {
    pub fn build(catalog: ToolCatalog) -> Result<Self> {
        let index = TfIdfIndex::build(&catalog.documents())?;
        Ok(Self { catalog, index })
    }
}

/// Shared, atomically swappable reference to the live catalog.
///
/// Readers take a snapshot and keep using it for the whole query, so a swap
/// never changes an index out from under an in-flight search.
pub type CatalogHandle = Arc<ArcSwap<IndexedCatalog>>;

pub struct LexicalStrategy {
    catalog: CatalogHandle,
}

impl LexicalStrategy {
    /// Build the index for `catalog`.
    ///
    /// # Errors
    /// Fails with `AppError::DuplicateDocument` if two tools share a name.
    pub fn new(catalog: ToolCatalog) -> Result<Self> {
        let indexed = IndexedCatalog::build(catalog)?;
        Ok(Self::from_handle(Arc::new(ArcSwap::from_pointee(indexed))))
    }

    pub fn from_handle(catalog: CatalogHandle) -> Self {
        Self { catalog }
    }

    /// The handle shared with other components that need tool metadata.
    pub fn handle(&self) -> CatalogHandle {
        Arc::clone(&self.catalog)
    }

    pub fn snapshot(&self) -> Arc<IndexedCatalog> {
        self.catalog.load_full()
    }

    /// Build a new index for `catalog` and swap it in.
    ///
    /// On error the previous catalog stays live.
    pub fn replace_catalog(&self, catalog: ToolCatalog) -> Result<()> {
        let indexed = IndexedCatalog::build(catalog)?;
        tracing::info!(
            tools = indexed.catalog.len(),
            vocabulary = indexed.index.vocabulary_size(),
            "Swapping in rebuilt tool index"
        );
        self.catalog.store(Arc::new(indexed));
        Ok(())
    }

    /// Synchronous ranking used by [`SelectionStrategy::select`].
    pub fn rank(
        &self,
        query: &str,
        available_tools: Option<&HashSet<String>>,
        limit: Option<usize>,
    ) -> Vec<ToolMatch> {
        let snapshot = self.catalog.load();
        let limit = limit.unwrap_or(DEFAULT_SELECT_LIMIT);

        let ranked = snapshot
            .index
            .search(query, limit)
            .into_iter()
            .map(|result| ToolMatch {
                description: snapshot
                    .catalog
                    .get(&result.id)
                    .map(|t| t.description.clone())
                    .unwrap_or_default(),
                name: result.id,
                score: result.score,
            })
            .collect();

        retain_available(ranked, available_tools)
    }
}

#[async_trait]
impl SelectionStrategy for LexicalStrategy {
    fn name(&self) -> &str {
        "lexical"
    }

    async fn select(
        &self,
        query: &str,
        available_tools: Option<&HashSet<String>>,
        limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        Ok(self.rank(query, available_tools, limit))
    }
}
