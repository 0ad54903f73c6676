//! Selection strategies: interchangeable ranking backends behind one trait.
//!
//! Callers hold an `Arc<dyn SelectionStrategy>` and never need to know which
//! backend ranks the catalog:
//!
//! - [`LexicalStrategy`]: in-process TF-IDF index over the tool catalog
//! - [`SemanticStrategy`]: client for a remote semantic `/search` endpoint
//! - [`CompositeStrategy`]: primary backend with a single lexical fallback

pub mod composite;
pub mod lexical;
pub mod semantic;

pub use composite::CompositeStrategy;
pub use lexical::{CatalogHandle, IndexedCatalog, LexicalStrategy};
pub use semantic::SemanticStrategy;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Result count used when a caller passes no limit.
pub const DEFAULT_SELECT_LIMIT: usize = 5;

/// A ranked tool as returned by any strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMatch {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub score: f64,
}

/// Contract shared by every ranking backend.
#[async_trait]
pub trait SelectionStrategy: Send + Sync {
    /// Short identifier recorded in logs and evaluation reports.
    fn name(&self) -> &str;

    /// Rank tools for `query`, best first.
    ///
    /// Ranking happens first, with `limit` (default [`DEFAULT_SELECT_LIMIT`]);
    /// `available_tools` then filters the ranked list. The filter never pulls
    /// lower-ranked tools up, so fewer than `limit` results may come back.
    async fn select(
        &self,
        query: &str,
        available_tools: Option<&HashSet<String>>,
        limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>>;

    /// Release external resources. Backends without any keep the default.
    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Named strategy variants, selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Lexical,
    Semantic,
    Composite,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
            Self::Composite => "composite",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "tfidf" | "local" => Ok(Self::Lexical),
            "semantic" | "remote" => Ok(Self::Semantic),
            "composite" | "meta-tools" | "meta_tools" => Ok(Self::Composite),
            other => Err(AppError::ValidationError(format!(
                "Unknown selection strategy '{}'. Use lexical, semantic or composite.",
                other
            ))),
        }
    }
}

/// Drop ranked matches whose names are not in `available_tools`, keeping order.
pub(crate) fn retain_available(
    mut matches: Vec<ToolMatch>,
    available_tools: Option<&HashSet<String>>,
) -> Vec<ToolMatch> {
    if let Some(allowed) = available_tools {
        matches.retain(|m| allowed.contains(&m.name));
    }
    matches
}
