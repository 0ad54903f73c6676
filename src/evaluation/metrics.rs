//! Aggregate ranking-quality metrics.
//!
//! Two metrics differ from their textbook definitions:
//!
//! - **MRR** averages `1/rank` only over successful cases that found the
//!   expected tool. Cases where it never appeared are left out rather than
//!   counted as 0, which inflates MRR relative to the canonical form.
//! - **NDCG@5** is the mean of `relevance / log2(rank + 1)` with
//!   `relevance = 1` only for a correct (rank 1) hit. There is no ideal-DCG
//!   divisor, so this is an unnormalized, simplified score.

use crate::evaluation::dataset::BenchmarkTestCase;
use crate::evaluation::evaluator::SelectionResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupAccuracy {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub total_cases: usize,
    /// Cases where the strategy answered without error
    pub successful_predictions: usize,
    pub correct_predictions: usize,
    pub error_count: usize,
    pub accuracy: f64,
    pub top_3_accuracy: f64,
    pub top_5_accuracy: f64,
    pub mrr: f64,
    pub ndcg_at_5: f64,
    /// Mean over all cases, errors included
    pub avg_execution_time_ms: f64,
    /// Accuracy per `function_category`, successful cases only
    pub category_accuracy: BTreeMap<String, GroupAccuracy>,
    /// Accuracy per difficulty, successful cases only
    pub difficulty_accuracy: BTreeMap<String, GroupAccuracy>,
}

impl EvaluationMetrics {
    /// Compute metrics for `results`. Category and difficulty come from the
    /// matching entry in `cases`; results without one are left out of the
    /// breakdowns only.
    pub fn compute(cases: &[BenchmarkTestCase], results: &[SelectionResult]) -> Self {
        let by_id: HashMap<&str, &BenchmarkTestCase> =
            cases.iter().map(|c| (c.id.as_str(), c)).collect();

        let successful: Vec<&SelectionResult> =
            results.iter().filter(|r| r.is_successful()).collect();
        let n_success = successful.len();

        let correct = successful.iter().filter(|r| r.is_correct).count();
        let within = |k: usize| {
            successful
                .iter()
                .filter(|r| r.predicted_rank.is_some_and(|rank| rank <= k))
                .count()
        };

        let reciprocal_ranks: Vec<f64> = successful
            .iter()
            .filter_map(|r| r.predicted_rank)
            .map(|rank| 1.0 / rank as f64)
            .collect();

        let dcg_sum: f64 = successful
            .iter()
            .map(|r| match r.predicted_rank {
                Some(rank) if rank <= 5 => {
                    let relevance = if r.is_correct { 1.0 } else { 0.0 };
                    relevance / ((rank + 1) as f64).log2()
                }
                _ => 0.0,
            })
            .sum();

        let mut category_accuracy: BTreeMap<String, GroupAccuracy> = BTreeMap::new();
        let mut difficulty_accuracy: BTreeMap<String, GroupAccuracy> = BTreeMap::new();
        for result in &successful {
            let Some(case) = by_id.get(result.test_case_id.as_str()) else {
                continue;
            };
            tally(&mut category_accuracy, &case.function_category, result.is_correct);
            tally(&mut difficulty_accuracy, case.difficulty.as_str(), result.is_correct);
        }
        for group in category_accuracy
            .values_mut()
            .chain(difficulty_accuracy.values_mut())
        {
            group.accuracy = ratio(group.correct, group.total);
        }

        Self {
            total_cases: results.len(),
            successful_predictions: n_success,
            correct_predictions: correct,
            error_count: results.len() - n_success,
            accuracy: ratio(correct, n_success),
            top_3_accuracy: ratio(within(3), n_success),
            top_5_accuracy: ratio(within(5), n_success),
            mrr: mean(&reciprocal_ranks),
            ndcg_at_5: if n_success == 0 {
                0.0
            } else {
                dcg_sum / n_success as f64
            },
            avg_execution_time_ms: mean(
                &results
                    .iter()
                    .map(|r| r.execution_time_ms)
                    .collect::<Vec<_>>(),
            ),
            category_accuracy,
            difficulty_accuracy,
        }
    }
}

fn tally(groups: &mut BTreeMap<String, GroupAccuracy>, key: &str, correct: bool) {
    let group = groups.entry(key.to_string()).or_default();
    group.total += 1;
    if correct {
        group.correct += 1;
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
