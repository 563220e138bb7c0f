use std::sync::Arc;

use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::matching::SimilarityScorer;
use crate::repository::Repository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub extractor: TextExtractor,
    /// Pluggable similarity backend. Default: TfIdfScorer.
    pub scorer: Arc<dyn SimilarityScorer>,
    pub config: Config,
}
