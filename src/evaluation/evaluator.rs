//! Drives a selection strategy over benchmark test cases.
//!
//! Each case is timed around the strategy call alone. A failing case is
//! recorded and the batch moves on; nothing a single case does can abort the
//! run or cancel another case.

use crate::evaluation::dataset::BenchmarkTestCase;
use crate::evaluation::report::EvaluationReport;
use crate::strategy::SelectionStrategy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Results requested from the strategy per test case.
pub const EVALUATION_LIMIT: usize = 10;

/// Error recorded when a strategy answers with an empty list.
pub const NO_RESULTS_ERROR: &str = "No results returned";

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub test_case_id: String,
    pub query: String,
    pub expected_function: String,
    /// Top-ranked tool, if the strategy returned anything
    pub predicted_function: Option<String>,
    /// 1-based rank of `expected_function`, if it was returned at all
    pub predicted_rank: Option<usize>,
    /// Only a rank-1 hit counts as correct
    pub is_correct: bool,
    pub execution_time_ms: f64,
    pub error: Option<String>,
}

impl SelectionResult {
    fn failed(case: &BenchmarkTestCase, error: String, execution_time_ms: f64) -> Self {
        Self {
            test_case_id: case.id.clone(),
            query: case.query.clone(),
            expected_function: case.expected_function.clone(),
            predicted_function: None,
            predicted_rank: None,
            is_correct: false,
            execution_time_ms,
            error: Some(error),
        }
    }

    /// True when the strategy answered; such cases feed the accuracy ratios.
    pub fn is_successful(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one test case against `strategy`.
pub async fn evaluate_case(
    strategy: &dyn SelectionStrategy,
    case: &BenchmarkTestCase,
) -> SelectionResult {
    let start = Instant::now();
    let outcome = strategy
        .select(&case.query, None, Some(EVALUATION_LIMIT))
        .await;
    let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let result = match outcome {
        Err(e) => {
            tracing::debug!(test_case = %case.id, error = %e, "Strategy call failed");
            SelectionResult::failed(case, e.to_string(), execution_time_ms)
        }
        Ok(matches) if matches.is_empty() => {
            SelectionResult::failed(case, NO_RESULTS_ERROR.to_string(), execution_time_ms)
        }
        Ok(matches) => {
            let predicted_rank = matches
                .iter()
                .position(|m| m.name == case.expected_function)
                .map(|idx| idx + 1);

            SelectionResult {
                test_case_id: case.id.clone(),
                query: case.query.clone(),
                expected_function: case.expected_function.clone(),
                predicted_function: Some(matches[0].name.clone()),
                predicted_rank,
                is_correct: predicted_rank == Some(1),
                execution_time_ms,
                error: None,
            }
        }
    };

    let outcome = match (&result.error, result.is_correct) {
        (Some(_), _) => "error",
        (None, true) => "correct",
        (None, false) => "incorrect",
    };
    metrics::counter!("evaluation_cases_total", "outcome" => outcome).increment(1);

    result
}

/// Evaluate `cases` one after another. Output order matches input order.
pub async fn run_evaluation(
    strategy: &dyn SelectionStrategy,
    cases: &[BenchmarkTestCase],
) -> Vec<SelectionResult> {
    let mut results = Vec::with_capacity(cases.len());
    for case in cases {
        results.push(evaluate_case(strategy, case).await);
    }
    results
}

/// Evaluate `cases` with at most `max_concurrency` strategy calls in flight.
///
/// The permit is taken before the timer starts, so queueing time never shows
/// up in a case's latency. A panicking case is recorded as an error. Output
/// order matches input order.
pub async fn run_evaluation_concurrent(
    strategy: Arc<dyn SelectionStrategy>,
    cases: &[BenchmarkTestCase],
    max_concurrency: usize,
) -> Vec<SelectionResult> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

    let handles: Vec<_> = cases
        .iter()
        .cloned()
        .map(|case| {
            let strategy = Arc::clone(&strategy);
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                // The semaphore is never closed, so acquire only fails if it is
                let _permit = semaphore.acquire_owned().await;
                evaluate_case(strategy.as_ref(), &case).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(cases.len());
    for (handle, case) in handles.into_iter().zip(cases) {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!(test_case = %case.id, error = %e, "Evaluation task failed");
                results.push(SelectionResult::failed(
                    case,
                    format!("Evaluation task failed: {}", e),
                    0.0,
                ));
            }
        }
    }
    results
}

/// Runs a full evaluation and assembles the report.
pub struct Evaluator {
    strategy: Arc<dyn SelectionStrategy>,
    max_concurrency: usize,
}

impl Evaluator {
    /// Sequential evaluator.
    pub fn new(strategy: Arc<dyn SelectionStrategy>) -> Self {
        Self {
            strategy,
            max_concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub async fn evaluate(&self, cases: &[BenchmarkTestCase]) -> EvaluationReport {
        let start = Instant::now();

        let results = if self.max_concurrency > 1 {
            run_evaluation_concurrent(Arc::clone(&self.strategy), cases, self.max_concurrency)
                .await
        } else {
            run_evaluation(self.strategy.as_ref(), cases).await
        };

        let report = EvaluationReport::new(self.strategy.name(), cases, results);

        tracing::info!(
            strategy = self.strategy.name(),
            total = report.metrics.total_cases,
            successful = report.metrics.successful_predictions,
            accuracy = report.metrics.accuracy,
            mrr = report.metrics.mrr,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Evaluation completed"
        );

        report
    }
}
