use crate::strategy::{StrategyKind, DEFAULT_SELECT_LIMIT};
use std::env;
use std::path::PathBuf;

impl StrategyKind {
    /// Reads `SELECTION_STRATEGY`; unset means lexical.
    pub fn from_env() -> anyhow::Result<Self> {
        match env::var("SELECTION_STRATEGY") {
            Ok(value) if !value.trim().is_empty() => Ok(value.parse()?),
            _ => Ok(Self::Lexical),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Tool catalog JSON. Without it the service starts with an empty catalog
    /// and reports not ready.
    pub tools_path: Option<PathBuf>,
    pub strategy: StrategyKind,
    /// Base URL of the remote semantic search service. Required by the
    /// semantic and composite strategies.
    pub semantic_search_url: Option<String>,
    pub semantic_timeout_secs: u64,
    /// Results returned when a search request names no limit.
    pub default_limit: usize,
    /// Largest limit a search request may ask for.
    pub max_limit: usize,
    pub shutdown_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            tools_path: None,
            strategy: StrategyKind::Lexical,
            semantic_search_url: None,
            semantic_timeout_secs: 10,
            default_limit: DEFAULT_SELECT_LIMIT,
            max_limit: 50,
            shutdown_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// `SELECTION_STRATEGY` picks the backend:
    /// - `lexical` (default): in-process TF-IDF over `TOOLS_PATH`
    /// - `semantic`: remote service at `SEMANTIC_SEARCH_URL`
    /// - `composite`: semantic first, lexical on failure
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            tools_path: env::var("TOOLS_PATH").ok().map(PathBuf::from),
            strategy: StrategyKind::from_env()?,
            semantic_search_url: env::var("SEMANTIC_SEARCH_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            semantic_timeout_secs: env::var("SEMANTIC_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            default_limit: env::var("DEFAULT_LIMIT")
                .unwrap_or_else(|_| DEFAULT_SELECT_LIMIT.to_string())
                .parse()?,
            max_limit: env::var("MAX_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.strategy != StrategyKind::Lexical && self.semantic_search_url.is_none() {
            anyhow::bail!(
                "SEMANTIC_SEARCH_URL must be set for the {} strategy",
                self.strategy.as_str()
            );
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            anyhow::bail!(
                "DEFAULT_LIMIT must be between 1 and MAX_LIMIT ({})",
                self.max_limit
            );
        }
        Ok(())
    }
}
