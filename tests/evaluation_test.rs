//! End-to-end evaluation runs over the fixture benchmark.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use toolsift::evaluation::{
    run_evaluation, run_evaluation_concurrent, BenchmarkTestCase, Difficulty, Split,
    NO_RESULTS_ERROR,
};
use toolsift::{
    AppError, BenchmarkDataset, CompositeStrategy, EvaluationReport, Evaluator, LexicalStrategy,
    Result, SelectionStrategy, ToolCatalog, ToolMatch,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn lexical() -> Arc<LexicalStrategy> {
    let catalog = ToolCatalog::load(&fixture("tools.json")).unwrap();
    Arc::new(LexicalStrategy::new(catalog).unwrap())
}

/// Always answers with the same ranked names.
struct Fixed(Vec<&'static str>);

#[async_trait]
impl SelectionStrategy for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn select(
        &self,
        _query: &str,
        _available_tools: Option<&HashSet<String>>,
        _limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        Ok(self
            .0
            .iter()
            .map(|name| ToolMatch {
                name: name.to_string(),
                description: String::new(),
                score: 0.9,
            })
            .collect())
    }
}

/// Fails every call and counts them.
#[derive(Default)]
struct Unavailable {
    calls: AtomicUsize,
}

#[async_trait]
impl SelectionStrategy for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn select(
        &self,
        _query: &str,
        _available_tools: Option<&HashSet<String>>,
        _limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::StrategyError("connection refused".into()))
    }
}

/// Panics on queries containing "boom".
struct Explosive;

#[async_trait]
impl SelectionStrategy for Explosive {
    fn name(&self) -> &str {
        "explosive"
    }

    async fn select(
        &self,
        query: &str,
        _available_tools: Option<&HashSet<String>>,
        _limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        if query.contains("boom") {
            panic!("strategy exploded");
        }
        Ok(vec![ToolMatch {
            name: query.to_string(),
            description: String::new(),
            score: 1.0,
        }])
    }
}

/// Sleeps before answering with the query as the tool name.
struct Slow(Duration);

#[async_trait]
impl SelectionStrategy for Slow {
    fn name(&self) -> &str {
        "slow"
    }

    async fn select(
        &self,
        query: &str,
        _available_tools: Option<&HashSet<String>>,
        _limit: Option<usize>,
    ) -> Result<Vec<ToolMatch>> {
        tokio::time::sleep(self.0).await;
        Ok(vec![ToolMatch {
            name: query.to_string(),
            description: String::new(),
            score: 1.0,
        }])
    }
}

#[tokio::test]
async fn test_single_correct_case_scores_perfectly() {
    let case = BenchmarkTestCase::new(
        "t1",
        "list employees",
        "hris_list_employees",
        "hris",
        Difficulty::Easy,
    );
    let report = Evaluator::new(Arc::new(Fixed(vec!["hris_list_employees"])))
        .evaluate(&[case])
        .await;

    assert_eq!(report.metrics.accuracy, 1.0);
    assert_eq!(report.metrics.mrr, 1.0);
    assert!(report.failure_analysis.is_empty());
}

#[tokio::test]
async fn test_empty_answer_is_recorded_as_error() {
    let case = BenchmarkTestCase::new("t1", "anything", "crm_create_deal", "crm", Difficulty::Hard);
    let results = run_evaluation(&Fixed(vec![]), &[case]).await;

    assert!(!results[0].is_correct);
    assert_eq!(results[0].error.as_deref(), Some(NO_RESULTS_ERROR));

    let report = EvaluationReport::new("fixed", &[], results);
    assert_eq!(report.metrics.successful_predictions, 0);
    assert_eq!(report.metrics.error_count, 1);
}

#[tokio::test]
async fn test_lexical_strategy_on_fixture_benchmark() {
    let dataset = BenchmarkDataset::load(&fixture("benchmark.json")).unwrap();
    assert_eq!(dataset.test_cases.len(), 7);
    assert_eq!(dataset.test_cases[1].extra["notes"], "paraphrase");

    let report = Evaluator::new(lexical()).evaluate(&dataset.test_cases).await;
    let m = &report.metrics;

    assert_eq!(report.evaluation_info.strategy, "lexical");
    assert_eq!(m.total_cases, 7);
    assert_eq!(m.successful_predictions, 6);
    assert_eq!(m.error_count, 1);
    assert_eq!(m.correct_predictions, 6);
    assert_eq!(m.accuracy, 1.0);
    assert_eq!(m.top_3_accuracy, 1.0);
    assert_eq!(m.mrr, 1.0);
    assert_eq!(m.ndcg_at_5, 1.0);
    assert!(m.avg_execution_time_ms >= 0.0);
    assert_eq!(m.category_accuracy["ats"].total, 2);
    assert!(!m.category_accuracy.contains_key("finance"));
    assert_eq!(m.difficulty_accuracy["easy"].accuracy, 1.0);

    assert_eq!(report.failure_analysis.len(), 1);
    let failure = &report.failure_analysis[0];
    assert_eq!(failure.test_case_id, "tc_007");
    assert_eq!(failure.error.as_deref(), Some(NO_RESULTS_ERROR));
    assert_eq!(failure.function_category.as_deref(), Some("finance"));
    assert_eq!(failure.difficulty, Some(Difficulty::Hard));
}

#[tokio::test]
async fn test_split_evaluation() {
    let dataset = BenchmarkDataset::load(&fixture("benchmark.json")).unwrap();
    let test_cases = dataset.split_cases(Split::Test);
    assert_eq!(test_cases.len(), 1);

    let report = Evaluator::new(lexical()).evaluate(&test_cases).await;
    assert_eq!(report.metrics.total_cases, 1);
    assert_eq!(report.results[0].test_case_id, "tc_006");
    assert!(report.results[0].is_correct);
}

#[tokio::test]
async fn test_concurrent_matches_sequential() {
    let dataset = BenchmarkDataset::load(&fixture("benchmark.json")).unwrap();
    let strategy = lexical();

    let sequential = run_evaluation(strategy.as_ref(), &dataset.test_cases).await;
    let concurrent = run_evaluation_concurrent(strategy, &dataset.test_cases, 3).await;

    let outcome = |results: &[toolsift::evaluation::SelectionResult]| {
        results
            .iter()
            .map(|r| {
                (
                    r.test_case_id.clone(),
                    r.predicted_function.clone(),
                    r.predicted_rank,
                    r.error.clone(),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(outcome(&sequential), outcome(&concurrent));
}

#[tokio::test]
async fn test_concurrent_latency_excludes_queue_wait() {
    let delay = Duration::from_millis(50);
    let cases: Vec<BenchmarkTestCase> = (0..4)
        .map(|i| {
            let name = format!("tool_{}", i);
            BenchmarkTestCase::new(format!("t{}", i), name.clone(), name, "misc", Difficulty::Easy)
        })
        .collect();

    let start = Instant::now();
    let results = run_evaluation_concurrent(Arc::new(Slow(delay)), &cases, 1).await;
    let wall = start.elapsed();

    // One permit: the four calls ran back to back
    assert!(wall >= delay * 4);
    for result in &results {
        assert!(result.is_correct);
        assert!(
            result.execution_time_ms >= 45.0 && result.execution_time_ms < 95.0,
            "case {} took {} ms",
            result.test_case_id,
            result.execution_time_ms
        );
    }
}

#[tokio::test]
async fn test_concurrent_run_records_panics_in_place() {
    let cases = vec![
        BenchmarkTestCase::new("t1", "first", "first", "misc", Difficulty::Easy),
        BenchmarkTestCase::new("t2", "boom", "boom", "misc", Difficulty::Easy),
        BenchmarkTestCase::new("t3", "third", "third", "misc", Difficulty::Easy),
    ];

    let results = run_evaluation_concurrent(Arc::new(Explosive), &cases, 2).await;

    let ids: Vec<&str> = results.iter().map(|r| r.test_case_id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    assert!(results[0].is_correct);
    assert!(!results[1].is_correct);
    assert!(results[1].error.is_some());
    assert!(results[2].is_correct);
}

#[tokio::test]
async fn test_composite_falls_back_to_lexical() {
    let primary = Arc::new(Unavailable::default());
    let composite = CompositeStrategy::new(primary.clone(), lexical());

    let dataset = BenchmarkDataset::load(&fixture("benchmark.json")).unwrap();
    let report = Evaluator::new(Arc::new(composite))
        .evaluate(&dataset.test_cases)
        .await;

    assert_eq!(primary.calls.load(Ordering::SeqCst), 7);
    assert_eq!(report.metrics.correct_predictions, 6);
    assert_eq!(report.metrics.error_count, 1);
}

#[tokio::test]
async fn test_composite_propagates_fallback_error() {
    let fallback = Arc::new(Unavailable::default());
    let composite = CompositeStrategy::new(Arc::new(Unavailable::default()), fallback.clone());

    let err = composite.select("anything", None, None).await.unwrap_err();

    assert!(matches!(err, AppError::StrategyError(_)));
    assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_report_round_trip() {
    let dataset = BenchmarkDataset::load(&fixture("benchmark.json")).unwrap();
    let report = Evaluator::new(lexical()).evaluate(&dataset.test_cases).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("evaluation_report.json");
    report.write_json(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for key in ["evaluation_info", "metrics", "results", "failure_analysis"] {
        assert!(raw.get(key).is_some(), "missing {}", key);
    }

    let loaded = EvaluationReport::load(&path).unwrap();
    assert_eq!(loaded.evaluation_info.run_id, report.evaluation_info.run_id);
    assert_eq!(loaded.metrics.correct_predictions, 6);
    assert_eq!(loaded.failure_analysis, report.failure_analysis);
}
