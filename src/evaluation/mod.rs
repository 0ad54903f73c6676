//! Selection-quality evaluation against labeled benchmarks.

pub mod dataset;
pub mod evaluator;
pub mod metrics;
pub mod report;

pub use dataset::{
    BenchmarkDataset, BenchmarkTestCase, DatasetStatistics, Difficulty, Split, SplitRatios, Splits,
};
pub use evaluator::{
    evaluate_case, run_evaluation, run_evaluation_concurrent, Evaluator, SelectionResult,
    EVALUATION_LIMIT, NO_RESULTS_ERROR,
};
pub use metrics::{EvaluationMetrics, GroupAccuracy};
pub use report::{failure_analysis, EvaluationInfo, EvaluationReport, FailureCase};
