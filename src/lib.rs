//! toolsift - tool discovery for AI agents
//!
//! Ranks a catalog of tool descriptions against natural language queries
//! (TF-IDF with cosine similarity), wraps ranking backends behind a common
//! selection strategy, and measures selection quality against labeled
//! benchmarks.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod handlers;
pub mod index;
pub mod ingestion;
pub mod state;
pub mod strategy;

// Re-export key types for convenience
pub use config::Config;
pub use error::{AppError, Result};
pub use evaluation::{BenchmarkDataset, EvaluationReport, Evaluator};
pub use index::{tokenize, Document, SearchResult, TfIdfIndex};
pub use ingestion::{ToolCatalog, ToolRecord};
pub use state::AppState;
pub use strategy::{
    CompositeStrategy, LexicalStrategy, SelectionStrategy, SemanticStrategy, StrategyKind,
    ToolMatch,
};
