//! Evaluation report: the JSON document handed to the report generator.

use crate::error::{AppError, Result};
use crate::evaluation::dataset::{BenchmarkTestCase, Difficulty};
use crate::evaluation::evaluator::SelectionResult;
use crate::evaluation::metrics::EvaluationMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInfo {
    pub evaluated_at: DateTime<Utc>,
    pub total_test_cases: usize,
    pub strategy: String,
    pub run_id: Uuid,
}

/// A case that needs a human look: wrong top-1 or a strategy error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureCase {
    pub test_case_id: String,
    pub query: String,
    pub expected_function: String,
    pub predicted_function: Option<String>,
    pub predicted_rank: Option<usize>,
    pub error: Option<String>,
    pub function_category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_info: EvaluationInfo,
    pub metrics: EvaluationMetrics,
    pub results: Vec<SelectionResult>,
    pub failure_analysis: Vec<FailureCase>,
}

impl EvaluationReport {
    pub fn new(strategy: &str, cases: &[BenchmarkTestCase], results: Vec<SelectionResult>) -> Self {
        Self {
            evaluation_info: EvaluationInfo {
                evaluated_at: Utc::now(),
                total_test_cases: results.len(),
                strategy: strategy.to_string(),
                run_id: Uuid::new_v4(),
            },
            metrics: EvaluationMetrics::compute(cases, &results),
            failure_analysis: failure_analysis(cases, &results),
            results,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AppError::ReportError(e.to_string()))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!(
            path = %path.display(),
            run_id = %self.evaluation_info.run_id,
            "Evaluation report written"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| AppError::ReportError(e.to_string()))
    }
}

/// Every incorrect or errored result, annotated with its test case metadata.
pub fn failure_analysis(
    cases: &[BenchmarkTestCase],
    results: &[SelectionResult],
) -> Vec<FailureCase> {
    let by_id: HashMap<&str, &BenchmarkTestCase> =
        cases.iter().map(|c| (c.id.as_str(), c)).collect();

    results
        .iter()
        .filter(|r| !r.is_correct || r.error.is_some())
        .map(|r| {
            let case = by_id.get(r.test_case_id.as_str());
            FailureCase {
                test_case_id: r.test_case_id.clone(),
                query: r.query.clone(),
                expected_function: r.expected_function.clone(),
                predicted_function: r.predicted_function.clone(),
                predicted_rank: r.predicted_rank,
                error: r.error.clone(),
                function_category: case.map(|c| c.function_category.clone()),
                difficulty: case.map(|c| c.difficulty),
            }
        })
        .collect()
}
