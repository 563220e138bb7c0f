//! Resume ↔ job similarity.
//!
//! `AppState` carries an `Arc<dyn SimilarityScorer>`; the default backend is
//! `TfIdfScorer`. Keyword overlap is computed independently of the scorer's
//! vocabulary.

pub mod stop_words;
pub mod summary;
pub mod tfidf;

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// 0 – 100, two decimal places.
    pub score: f64,
    pub keywords: BTreeSet<String>,
}

impl MatchResult {
    /// Keywords as stored on a comparison row.
    pub fn keywords_joined(&self) -> String {
        self.keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub trait SimilarityScorer: Send + Sync {
    fn score(&self, resume_text: &str, job_text: &str) -> MatchResult;
}

pub struct TfIdfScorer;

impl SimilarityScorer for TfIdfScorer {
    fn score(&self, resume_text: &str, job_text: &str) -> MatchResult {
        let similarity = tfidf::cosine_similarity(resume_text, job_text);
        MatchResult {
            score: to_percentage(similarity),
            keywords: common_keywords(resume_text, job_text),
        }
    }
}

fn to_percentage(similarity: f64) -> f64 {
    ((similarity * 100.0 * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Literal overlap of lowercase whitespace-separated tokens. Stop words and
/// punctuation are kept as-is.
pub fn common_keywords(resume_text: &str, job_text: &str) -> BTreeSet<String> {
    let tokens = |text: &str| -> BTreeSet<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    };
    let resume = tokens(resume_text);
    let job = tokens(job_text);
    resume.intersection(&job).cloned().collect()
}
