//! Text normalization shared by index build and query time.
//!
//! Both sides of the index must see identical terms, so every path that turns
//! text into terms goes through [`tokenize`].

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could",
        "do", "does", "for", "from", "had", "has", "have", "i", "if", "in", "into", "is", "it",
        "its", "me", "my", "of", "on", "or", "our", "should", "so", "such", "that", "the",
        "their", "them", "then", "there", "these", "they", "this", "those", "to", "was", "we",
        "were", "what", "when", "where", "which", "who", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `term` (already lowercased) is dropped by the tokenizer.
pub fn is_stopword(term: &str) -> bool {
    STOP_WORDS.contains(term)
}

/// Tokenize text: lowercase, split on non-alphanumeric, remove stop words.
///
/// Order is preserved and duplicates are kept, so the output doubles as the
/// raw term-frequency source. No stemming is applied.
///
/// Case folding is `str::to_lowercase`, so matching is case-insensitive for
/// ASCII and for scripts with one-to-one case mappings. Letters whose
/// uppercase form expands (`ß` to `SS`) fold to a different term than the
/// original, e.g. `STRASSE` gives `strasse` while `straße` stays `straße`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(String::from)
        .collect()
}

/// Raw term counts for `text`.
pub fn term_frequencies(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in tokenize(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_folding_is_per_character() {
        assert_eq!(tokenize("Schedule MEETING"), tokenize("schedule meeting"));
        assert_eq!(tokenize("ÉQUIPE"), vec!["équipe"]);
        // Uppercase expansion is not reversible
        assert_eq!(tokenize("STRASSE"), vec!["strasse"]);
        assert_eq!(tokenize("straße"), vec!["straße"]);
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        let tokens = tokenize("List Employees, fast!");
        assert_eq!(tokens, vec!["list", "employees", "fast"]);
    }

    #[test]
    fn test_tokenize_splits_tool_names() {
        let tokens = tokenize("hris_list_employees");
        assert_eq!(tokens, vec!["hris", "list", "employees"]);
    }

    #[test]
    fn test_tokenize_drops_stopwords() {
        let tokens = tokenize("the onboarding meeting!!!");
        assert_eq!(tokens, vec!["onboarding", "meeting"]);
    }

    #[test]
    fn test_tokenize_keeps_single_characters_and_digits() {
        let tokens = tokenize("v2 x 404");
        assert_eq!(tokens, vec!["v2", "x", "404"]);
    }

    #[test]
    fn test_tokenize_empty_and_stopword_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ...---...").is_empty());
        assert!(tokenize("The and OF to a").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_duplicates_in_order() {
        let tokens = tokenize("alpha beta alpha");
        assert_eq!(tokens, vec!["alpha", "beta", "alpha"]);
    }

    #[test]
    fn test_tokenize_unicode_alphanumerics() {
        let tokens = tokenize("Café-Über");
        assert_eq!(tokens, vec!["café", "über"]);
    }

    #[test]
    fn test_term_frequencies_counts() {
        let tf = term_frequencies("alpha alpha beta the");
        assert_eq!(tf.get("alpha"), Some(&2));
        assert_eq!(tf.get("beta"), Some(&1));
        assert_eq!(tf.get("the"), None);
    }
}
