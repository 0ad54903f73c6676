//! Benchmark dataset model.
//!
//! Known fields are typed; anything else a dataset generator adds to a test
//! case or to the statistics block lands in an `extra` map and is written back
//! unchanged.

use crate::error::{AppError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labeled query with its ground-truth tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTestCase {
    pub id: String,
    pub query: String,
    pub expected_function: String,
    pub function_category: String,
    pub difficulty: Difficulty,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BenchmarkTestCase {
    pub fn new(
        id: impl Into<String>,
        query: impl Into<String>,
        expected_function: impl Into<String>,
        function_category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            expected_function: expected_function.into(),
            function_category: function_category.into(),
            difficulty,
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    #[serde(default)]
    pub total_test_cases: usize,
    #[serde(default)]
    pub by_category: BTreeMap<String, usize>,
    #[serde(default)]
    pub by_difficulty: BTreeMap<String, usize>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DatasetStatistics {
    pub fn from_cases(cases: &[BenchmarkTestCase]) -> Self {
        let mut stats = Self {
            total_test_cases: cases.len(),
            ..Default::default()
        };
        for case in cases {
            *stats
                .by_category
                .entry(case.function_category.clone())
                .or_insert(0) += 1;
            *stats
                .by_difficulty
                .entry(case.difficulty.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

/// Test case ids per partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Splits {
    #[serde(default)]
    pub train: Vec<String>,
    #[serde(default)]
    pub test: Vec<String>,
    #[serde(default)]
    pub validation: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
    Validation,
}

/// Fractions for train and test; validation receives the remainder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.7,
            test: 0.15,
        }
    }
}

impl Splits {
    /// Shuffle `ids` with a seeded RNG and cut them into partitions.
    ///
    /// The same ids, seed and ratios always give the same partitions.
    pub fn partition(ids: &[String], seed: u64, ratios: SplitRatios) -> Result<Self> {
        let valid = |r: f64| (0.0..=1.0).contains(&r);
        if !valid(ratios.train) || !valid(ratios.test) || ratios.train + ratios.test > 1.0 {
            return Err(AppError::DatasetError(format!(
                "Invalid split ratios: train={} test={}",
                ratios.train, ratios.test
            )));
        }

        let mut shuffled = ids.to_vec();
        let mut rng = StdRng::seed_from_u64(seed);
        shuffled.shuffle(&mut rng);

        let n = shuffled.len();
        let train_end = ((n as f64 * ratios.train).round() as usize).min(n);
        let test_end = (train_end + (n as f64 * ratios.test).round() as usize).min(n);

        let validation = shuffled.split_off(test_end);
        let test = shuffled.split_off(train_end);

        Ok(Self {
            train: shuffled,
            test,
            validation,
        })
    }

    pub fn ids(&self, split: Split) -> &[String] {
        match split {
            Split::Train => &self.train,
            Split::Test => &self.test,
            Split::Validation => &self.validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDataset {
    pub version: String,
    pub generated_at: String,
    #[serde(default)]
    pub statistics: DatasetStatistics,
    #[serde(default)]
    pub splits: Splits,
    pub test_cases: Vec<BenchmarkTestCase>,
}

impl BenchmarkDataset {
    /// Assemble a dataset with computed statistics and seeded splits.
    pub fn generate(
        version: impl Into<String>,
        test_cases: Vec<BenchmarkTestCase>,
        seed: u64,
        ratios: SplitRatios,
    ) -> Result<Self> {
        let ids: Vec<String> = test_cases.iter().map(|c| c.id.clone()).collect();
        let dataset = Self {
            version: version.into(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            statistics: DatasetStatistics::from_cases(&test_cases),
            splits: Splits::partition(&ids, seed, ratios)?,
            test_cases,
        };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let dataset: Self =
            serde_json::from_str(raw).map_err(|e| AppError::DatasetError(e.to_string()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            version = %dataset.version,
            test_cases = dataset.test_cases.len(),
            "Benchmark dataset loaded"
        );
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::DatasetError(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Test case ids must be unique and every split id must name a test case.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.test_cases.len());
        for case in &self.test_cases {
            if !seen.insert(case.id.as_str()) {
                return Err(AppError::DatasetError(format!(
                    "Duplicate test case id: {}",
                    case.id
                )));
            }
        }

        for split in [Split::Train, Split::Test, Split::Validation] {
            if let Some(missing) = self.splits.ids(split).iter().find(|id| !seen.contains(id.as_str())) {
                return Err(AppError::DatasetError(format!(
                    "Split {:?} references unknown test case: {}",
                    split, missing
                )));
            }
        }
        Ok(())
    }

    /// Test cases of one partition, in split order.
    pub fn split_cases(&self, split: Split) -> Vec<BenchmarkTestCase> {
        let by_id: HashMap<&str, &BenchmarkTestCase> = self
            .test_cases
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();

        self.splits
            .ids(split)
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .cloned()
            .collect()
    }
}
