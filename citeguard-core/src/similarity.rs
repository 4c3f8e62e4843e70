//! Pairwise similarity scoring between text spans.
//!
//! The scorer is the leaf utility under both fact verification and retrieval
//! filtering: a deterministic, bounded scalar in `[0.0, 1.0]`, where higher
//! means stronger overlap. Downstream logic only compares it against a
//! threshold, so the metric itself is substitutable via [`Embedder`].

use crate::embeddings::{Embedder, cosine_similarity};
use std::sync::Arc;

/// Scores relatedness between two text spans.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn Embedder>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Score two spans in `[0.0, 1.0]`. Returns `0.0` when either input is
    /// empty or whitespace-only.
    pub fn score(&self, a: &str, b: &str) -> f32 {
        if a.trim().is_empty() || b.trim().is_empty() {
            return 0.0;
        }
        let va = self.embedder.embed(a);
        let vb = self.embedder.embed(b);
        cosine_similarity(&va, &vb).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for SimilarityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityScorer")
            .field("provider", &self.embedder.provider_name())
            .field("dimensions", &self.embedder.dimensions())
            .finish()
    }
}
