//! Primary backend with a one-shot fallback.

use crate::error::Result;
use crate::strategy::{SelectionStrategy, ToolMatch};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Tries `primary`; on any error calls `fallback` once and returns its
/// answer. A failing fallback propagates its own error. There is no retry
/// loop here.
pub struct CompositeStrategy {
    primary: Arc<dyn SelectionStrategy>,
    fallback: Arc<dyn SelectionStrategy>,
}

impl CompositeStrategy {
    pub fn new(primary: Arc<dyn SelectionStrategy>, fallback: Arc<dyn SelectionStrategy>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SelectionStrategy for CompositeStrategy {
    fn name(&self) -> &str {
        "composite"
    }

    async fn select(
        &self,
        query: &str,
        available_tools: Option<&HashSet<String>>,
        limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        match self.primary.select(query, available_tools, limit).await {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Primary strategy failed, using fallback"
                );
                metrics::counter!("strategy_fallbacks_total").increment(1);
                self.fallback.select(query, available_tools, limit).await
            }
        }
    }

    async fn cleanup(&self) -> Result<()> {
        let primary = self.primary.cleanup().await;
        let fallback = self.fallback.cleanup().await;
        primary.and(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        name: &'static str,
        fail: bool,
        calls: AtomicUsize,
        cleanups: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                calls: AtomicUsize::new(0),
                cleanups: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SelectionStrategy for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn select(
            &self,
            _query: &str,
            _available_tools: Option<&HashSet<String>>,
            _limit: Option<usize>,
        ) -> Result<Vec<ToolMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::StrategyError(format!("{} down", self.name)));
            }
            Ok(vec![ToolMatch {
                name: format!("{}_tool", self.name),
                description: String::new(),
                score: 0.5,
            }])
        }

        async fn cleanup(&self) -> Result<()> {
            self.cleanups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Scripted::new("primary", false);
        let fallback = Scripted::new("fallback", false);
        let composite = CompositeStrategy::new(primary.clone(), fallback.clone());

        let matches = composite.select("q", None, None).await.unwrap();
        assert_eq!(matches[0].name, "primary_tool");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_once() {
        let primary = Scripted::new("primary", true);
        let fallback = Scripted::new("fallback", false);
        let composite = CompositeStrategy::new(primary.clone(), fallback.clone());

        let matches = composite.select("q", None, None).await.unwrap();
        assert_eq!(matches[0].name, "fallback_tool");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates() {
        let primary = Scripted::new("primary", true);
        let fallback = Scripted::new("fallback", true);
        let composite = CompositeStrategy::new(primary.clone(), fallback.clone());

        let err = composite.select("q", None, None).await.unwrap_err();
        assert!(err.to_string().contains("fallback down"));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cleanup_reaches_both() {
        let primary = Scripted::new("primary", false);
        let fallback = Scripted::new("fallback", false);
        let composite = CompositeStrategy::new(primary.clone(), fallback.clone());

        composite.cleanup().await.unwrap();
        assert_eq!(primary.cleanups.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.cleanups.load(Ordering::SeqCst), 1);
    }
}
