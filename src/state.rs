use crate::config::Config;
use crate::error::{AppError, Result};
use crate::ingestion::ToolCatalog;
use crate::strategy::{
    CompositeStrategy, LexicalStrategy, SelectionStrategy, SemanticStrategy, StrategyKind,
};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all request handlers.
///
/// The lexical strategy is always present: it serves lexical mode directly,
/// is the composite fallback, and owns the catalog that `/reload` swaps.
pub struct AppState {
    pub lexical: Arc<LexicalStrategy>,
    pub strategy: Arc<dyn SelectionStrategy>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Load the catalog named by `config.tools_path` (if any) and build the
    /// configured strategy.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = match &config.tools_path {
            Some(path) => ToolCatalog::load(path)?,
            None => {
                tracing::warn!("TOOLS_PATH not set, starting with an empty tool catalog");
                ToolCatalog::default()
            }
        };
        Self::with_catalog(config, catalog)
    }

    pub fn with_catalog(config: Config, catalog: ToolCatalog) -> Result<Self> {
        let lexical = Arc::new(LexicalStrategy::new(catalog)?);
        let strategy = build_strategy(&config, &lexical)?;

        tracing::info!(
            strategy = strategy.name(),
            tools = lexical.snapshot().catalog.len(),
            "Selection strategy ready"
        );

        Ok(Self {
            lexical,
            strategy,
            config: Arc::new(config),
        })
    }

    /// Ready once at least one tool is indexed.
    pub fn is_ready(&self) -> bool {
        !self.lexical.snapshot().catalog.is_empty()
    }

    /// Re-read `tools_path` and swap in a freshly built index.
    pub fn reload_catalog(&self) -> Result<Arc<crate::strategy::IndexedCatalog>> {
        let path = self.config.tools_path.as_ref().ok_or_else(|| {
            AppError::ValidationError("No catalog to reload: TOOLS_PATH is not set".to_string())
        })?;
        let catalog = ToolCatalog::load(path)?;
        self.lexical.replace_catalog(catalog)?;
        Ok(self.lexical.snapshot())
    }
}

fn build_strategy(
    config: &Config,
    lexical: &Arc<LexicalStrategy>,
) -> Result<Arc<dyn SelectionStrategy>> {
    let semantic = || -> Result<Arc<dyn SelectionStrategy>> {
        let url = config.semantic_search_url.as_deref().ok_or_else(|| {
            AppError::ValidationError(format!(
                "SEMANTIC_SEARCH_URL must be set for the {} strategy",
                config.strategy.as_str()
            ))
        })?;
        let strategy: Arc<dyn SelectionStrategy> = Arc::new(
            SemanticStrategy::new(url, Duration::from_secs(config.semantic_timeout_secs))?
                .with_catalog(lexical.handle()),
        );
        Ok(strategy)
    };

    let strategy: Arc<dyn SelectionStrategy> = match config.strategy {
        StrategyKind::Lexical => lexical.clone(),
        StrategyKind::Semantic => semantic()?,
        StrategyKind::Composite => Arc::new(CompositeStrategy::new(semantic()?, lexical.clone())),
    };
    Ok(strategy)
}
