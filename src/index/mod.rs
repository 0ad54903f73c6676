pub mod tfidf;
pub mod tokenize;

pub use tfidf::{documents_from_json, Document, SearchResult, TfIdfIndex};
pub use tokenize::{is_stopword, term_frequencies, tokenize};
