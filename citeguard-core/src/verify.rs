//! Answer verification — check generated statements against retrieved context.
//!
//! The verifier decomposes an answer into sentence-level statements, scores
//! each against the retrieved context as a whole, and aggregates the results
//! into a validity flag, a confidence fraction, and a warning per unsupported
//! statement. It never fails for well-formed text input.

use crate::config::VerificationConfig;
use crate::embeddings::Embedder;
use crate::similarity::SimilarityScorer;
use crate::statements::extract_statements;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Warning emitted when there is no context to verify against.
pub const NO_DOCUMENTS_WARNING: &str = "No relevant documents found for this query";

/// Verification outcome for a single statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementCheck {
    pub statement: String,
    pub similarity: f32,
    pub supported: bool,
}

/// Aggregate verification outcome for one answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True only when the supported fraction reaches the validity threshold.
    pub is_valid: bool,
    /// Fraction of statements judged supported, in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Human-readable, non-authoritative; one entry per unsupported statement.
    pub warnings: Vec<String>,
    /// Per-statement detail, in answer order.
    pub checks: Vec<StatementCheck>,
}

impl VerificationResult {
    fn rejected(warning: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            warnings: vec![warning.into()],
            checks: Vec::new(),
        }
    }
}

/// Validates answer factuality against retrieved context.
#[derive(Debug, Clone)]
pub struct FactVerifier {
    scorer: SimilarityScorer,
    /// Per-statement support threshold.
    similarity_threshold: f32,
    /// Aggregate validity threshold.
    validity_threshold: f32,
}

impl FactVerifier {
    pub fn new(
        scorer: SimilarityScorer,
        similarity_threshold: f32,
        validity_threshold: Option<f32>,
    ) -> Self {
        Self {
            scorer,
            similarity_threshold,
            validity_threshold: validity_threshold.unwrap_or(similarity_threshold),
        }
    }

    pub fn from_config(config: &VerificationConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self::new(
            SimilarityScorer::new(embedder),
            config.similarity_threshold,
            config.validity_threshold,
        )
    }

    /// Validate `answer` against `context`.
    ///
    /// `sources` is the attribution list for the retrieved documents; it does
    /// not affect scoring, but an empty list raises a warning since the
    /// answer then has nothing to cite.
    pub fn validate(&self, answer: &str, context: &str, sources: &[String]) -> VerificationResult {
        if context.trim().is_empty() || answer.trim().is_empty() {
            return VerificationResult::rejected(NO_DOCUMENTS_WARNING);
        }

        let statements = extract_statements(answer);
        if statements.is_empty() {
            return VerificationResult::rejected("Answer contained no checkable statements");
        }

        let checks: Vec<StatementCheck> = statements
            .into_iter()
            .map(|statement| {
                let similarity = self.scorer.score(&statement, context);
                let supported = similarity >= self.similarity_threshold;
                StatementCheck {
                    statement,
                    similarity,
                    supported,
                }
            })
            .collect();

        let supported_count = checks.iter().filter(|c| c.supported).count();
        let confidence = supported_count as f64 / checks.len() as f64;

        let mut warnings: Vec<String> = checks
            .iter()
            .filter(|c| !c.supported)
            .map(|c| format!("Statement not supported by the documents: \"{}\"", c.statement))
            .collect();
        if sources.is_empty() {
            warnings.push("No source documents were attributed to this answer".to_string());
        }

        let is_valid = confidence >= f64::from(self.validity_threshold);
        debug!(
            statements = checks.len(),
            supported = supported_count,
            confidence,
            is_valid,
            "verified answer against context"
        );

        VerificationResult {
            is_valid,
            confidence,
            warnings,
            checks,
        }
    }
}
