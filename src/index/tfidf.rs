//! TF-IDF index with cosine-similarity ranking.
//!
//! The index is built once from a corpus and never mutated afterwards, so a
//! shared `Arc<TfIdfIndex>` can serve any number of concurrent queries. A
//! changed corpus means building a new index and swapping the reference.
//!
//! # Weighting
//! - `idf(t) = ln((1 + N) / (1 + df(t))) + 1`, strictly positive for every
//!   indexed term, including a term present in all `N` documents.
//! - `w(t, d) = tf(t, d) × idf(t)`, raw counts with no sublinear scaling.
//! - `score(q, d) = (q · d) / (‖q‖ ‖d‖)`. All weights are non-negative, so
//!   the score is in `[0, 1]`.

use crate::error::{AppError, Result};
use crate::index::tokenize::tokenize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A unit of indexable text. For tool discovery the id is the tool name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A ranked match. `score` is cosine similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f64,
}

/// Sparse weight vector keyed by term id, sorted ascending by term id.
#[derive(Debug, Clone)]
struct DocumentVector {
    weights: Vec<(usize, f64)>,
    norm: f64,
}

impl DocumentVector {
    fn weight(&self, term_id: usize) -> f64 {
        self.weights
            .binary_search_by_key(&term_id, |&(t, _)| t)
            .map(|pos| self.weights[pos].1)
            .unwrap_or(0.0)
    }
}

/// Immutable TF-IDF snapshot of a corpus. `Default` is the empty index.
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    /// Document ids in corpus order. Position doubles as the tie-break rank.
    ids: Vec<String>,
    positions: HashMap<String, usize>,
    /// term -> term id, assigned in first-occurrence order
    vocabulary: HashMap<String, usize>,
    document_frequency: Vec<u32>,
    idf: Vec<f64>,
    /// Per-document raw counts, keyed by term id
    term_frequencies: Vec<BTreeMap<usize, u32>>,
    vectors: Vec<DocumentVector>,
    /// term id -> ascending document positions containing the term
    postings: Vec<Vec<usize>>,
}

impl TfIdfIndex {
    /// Build an index from `corpus` in a single pass.
    ///
    /// # Errors
    /// Returns `AppError::DuplicateDocument` if two documents share an id.
    /// Duplicates are rejected rather than merged.
    pub fn build(corpus: &[Document]) -> Result<Self> {
        let n = corpus.len();
        let mut ids = Vec::with_capacity(n);
        let mut positions = HashMap::with_capacity(n);
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: Vec<u32> = Vec::new();
        let mut postings: Vec<Vec<usize>> = Vec::new();
        let mut term_frequencies = Vec::with_capacity(n);

        for (pos, doc) in corpus.iter().enumerate() {
            if positions.insert(doc.id.clone(), pos).is_some() {
                return Err(AppError::DuplicateDocument(doc.id.clone()));
            }
            ids.push(doc.id.clone());

            let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
            for term in tokenize(&doc.text) {
                let next_id = vocabulary.len();
                let term_id = *vocabulary.entry(term).or_insert_with(|| {
                    document_frequency.push(0);
                    postings.push(Vec::new());
                    next_id
                });
                *counts.entry(term_id).or_insert(0) += 1;
            }

            for &term_id in counts.keys() {
                document_frequency[term_id] += 1;
                postings[term_id].push(pos);
            }
            term_frequencies.push(counts);
        }

        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| smoothed_idf(n, df as usize))
            .collect();

        let vectors = term_frequencies
            .iter()
            .map(|counts| {
                let weights: Vec<(usize, f64)> = counts
                    .iter()
                    .map(|(&term_id, &tf)| (term_id, tf as f64 * idf[term_id]))
                    .collect();
                let norm = l2_norm(weights.iter().map(|&(_, w)| w));
                DocumentVector { weights, norm }
            })
            .collect();

        tracing::debug!(
            documents = n,
            vocabulary = vocabulary.len(),
            "TF-IDF index built"
        );

        Ok(Self {
            ids,
            positions,
            vocabulary,
            document_frequency,
            idf,
            term_frequencies,
            vectors,
            postings,
        })
    }

    /// Rank documents against `query`, returning at most `k` results.
    ///
    /// Documents sharing no term with the query are left out entirely.
    /// Equal scores keep corpus order. Empty corpora, empty queries and
    /// queries made only of stopwords or unknown terms return nothing.
    pub fn search(&self, query: &str, k: usize) -> Vec<SearchResult> {
        if k == 0 || self.ids.is_empty() {
            return Vec::new();
        }

        // Sorted by term id so the float sums below are order-stable
        let mut query_counts: BTreeMap<usize, u32> = BTreeMap::new();
        for term in tokenize(query) {
            if let Some(&term_id) = self.vocabulary.get(&term) {
                *query_counts.entry(term_id).or_insert(0) += 1;
            }
        }
        if query_counts.is_empty() {
            return Vec::new();
        }

        let query_weights: Vec<(usize, f64)> = query_counts
            .into_iter()
            .map(|(term_id, tf)| (term_id, tf as f64 * self.idf[term_id]))
            .collect();
        let query_norm = l2_norm(query_weights.iter().map(|&(_, w)| w));

        let mut dots: BTreeMap<usize, f64> = BTreeMap::new();
        for &(term_id, query_weight) in &query_weights {
            for &pos in &self.postings[term_id] {
                *dots.entry(pos).or_insert(0.0) +=
                    query_weight * self.vectors[pos].weight(term_id);
            }
        }

        let mut scored: Vec<(usize, f64)> = dots
            .into_iter()
            .filter_map(|(pos, dot)| {
                let denom = query_norm * self.vectors[pos].norm;
                (denom > 0.0).then(|| (pos, (dot / denom).clamp(0.0, 1.0)))
            })
            .collect();

        // Stable: ties stay in corpus order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(k)
            .map(|(pos, score)| SearchResult {
                id: self.ids[pos].clone(),
                score,
            })
            .collect()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Document ids in corpus order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of documents containing `term`; 0 for unknown terms.
    pub fn document_frequency(&self, term: &str) -> u32 {
        self.vocabulary
            .get(term)
            .map(|&t| self.document_frequency[t])
            .unwrap_or(0)
    }

    /// Stored idf for `term`, or `None` if the term is not in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&t| self.idf[t])
    }

    /// Raw count of `term` in document `id`.
    pub fn term_frequency(&self, id: &str, term: &str) -> u32 {
        let (Some(&pos), Some(term_id)) = (self.positions.get(id), self.vocabulary.get(term))
        else {
            return 0;
        };
        self.term_frequencies[pos]
            .get(term_id)
            .copied()
            .unwrap_or(0)
    }
}

/// Parse a JSON array of `{id, text}` objects into documents.
///
/// Entries with a missing or non-string `id`/`text` fail the whole load with
/// `AppError::MalformedDocument`, naming the entry index.
pub fn documents_from_json(json: &Value) -> Result<Vec<Document>> {
    let entries = json.as_array().ok_or_else(|| {
        AppError::MalformedDocument("Expected a JSON array of documents".into())
    })?;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let id = entry.get("id").and_then(Value::as_str).ok_or_else(|| {
                AppError::MalformedDocument(format!("entry {}: 'id' must be a string", idx))
            })?;
            let text = entry.get("text").and_then(Value::as_str).ok_or_else(|| {
                AppError::MalformedDocument(format!("entry {}: 'text' must be a string", idx))
            })?;
            Ok(Document::new(id, text))
        })
        .collect()
}

#[inline]
fn smoothed_idf(n: usize, df: usize) -> f64 {
    ((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0
}

#[inline]
fn l2_norm(weights: impl Iterator<Item = f64>) -> f64 {
    weights.map(|w| w * w).sum::<f64>().sqrt()
}
