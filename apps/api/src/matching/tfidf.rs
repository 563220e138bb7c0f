//! TF-IDF vectorization over a two-document corpus and cosine similarity.
//!
//! Weighting:
//! - tf = raw term count
//! - idf(t) = ln((1 + n) / (1 + df(t))) + 1, n = number of documents
//! - vectors are L2-normalised, so cosine similarity is the dot product

use std::collections::HashMap;

use crate::matching::stop_words::is_stop_word;

/// Lowercases and splits on anything that is not a word character, keeping
/// tokens of two or more characters that are not stop words.
pub fn analyze(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

fn term_counts(tokens: &[String]) -> HashMap<&str, f64> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Cosine similarity in [0, 1] between the TF-IDF vectors of `a` and `b`,
/// fitted on the corpus `[a, b]`.
///
/// A document with no usable terms has a zero vector; similarity is then 0.0.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = analyze(a);
    let tokens_b = analyze(b);
    let counts_a = term_counts(&tokens_a);
    let counts_b = term_counts(&tokens_b);

    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    const N_DOCS: f64 = 2.0;
    let idf = |term: &str| {
        let df = counts_a.contains_key(term) as u8 + counts_b.contains_key(term) as u8;
        ((1.0 + N_DOCS) / (1.0 + df as f64)).ln() + 1.0
    };

    let weights = |counts: &HashMap<&str, f64>| -> HashMap<String, f64> {
        counts
            .iter()
            .map(|(term, tf)| (term.to_string(), tf * idf(*term)))
            .collect()
    };
    let wa = weights(&counts_a);
    let wb = weights(&counts_b);

    let norm = |w: &HashMap<String, f64>| w.values().map(|v| v * v).sum::<f64>().sqrt();
    let (na, nb) = (norm(&wa), norm(&wb));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }

    let dot: f64 = wa
        .iter()
        .filter_map(|(term, x)| wb.get(term).map(|y| x * y))
        .sum();

    (dot / (na * nb)).clamp(0.0, 1.0)
}
