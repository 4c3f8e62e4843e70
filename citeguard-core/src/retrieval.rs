//! Retrieval — the nearest-documents collaborator interface and the
//! bundled brute-force vector store.
//!
//! The orchestrator only depends on [`Retriever`]; the store here is the
//! default implementation, embedding chunks with a local [`Embedder`] and
//! ranking by cosine similarity. Results arrive best-first and the
//! orchestrator never recomputes ranking.

use crate::embeddings::{Embedder, cosine_similarity};
use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// One retrieved document, best-first within a result list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Chunk text handed to generation as context.
    pub text: String,
    /// Opaque source descriptor, used only for attribution display.
    pub source: String,
    /// Similarity against the query; higher is closer.
    pub score: f32,
}

/// Retrieval interface consumed by the orchestrator.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` documents for `query`, already sorted best-first.
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError>;
}

/// Retriever tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverConfig {
    pub top_k: usize,
    pub min_score: f32,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            min_score: 0.1,
        }
    }
}

/// A stored, embedded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// On-disk shape of the persisted index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    dimensions: usize,
    entries: Vec<StoredChunk>,
}

/// In-memory vector store with brute-force cosine search and JSON
/// persistence.
pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    min_score: f32,
    entries: Vec<StoredChunk>,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("entries", &self.entries.len())
            .field("min_score", &self.min_score)
            .finish()
    }
}

impl VectorStore {
    /// Create an empty store.
    pub fn new(embedder: Arc<dyn Embedder>, min_score: f32) -> Self {
        Self {
            embedder,
            min_score,
            entries: Vec::new(),
        }
    }

    /// Embed and store one chunk of text under a source descriptor.
    pub fn add(&mut self, source: &str, url: Option<&str>, text: &str) {
        let embedding = self.embedder.embed(text);
        self.entries.push(StoredChunk {
            id: uuid::Uuid::new_v4().to_string(),
            source: source.to_string(),
            url: url.map(String::from),
            text: text.to_string(),
            embedding,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-`k` cosine search over the stored chunks, filtered by the
    /// similarity floor, best-first.
    pub fn search(&self, query: &str, k: usize) -> Vec<RetrievedDocument> {
        let query_embedding = self.embedder.embed(query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(&query_embedding, &entry.embedding)))
            .filter(|(_, score)| *score >= self.min_score)
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(query, results = scored.len(), "vector search");
        scored
            .into_iter()
            .map(|(i, score)| RetrievedDocument {
                text: self.entries[i].text.clone(),
                source: self.entries[i].source.clone(),
                score,
            })
            .collect()
    }

    /// Persist the index as JSON.
    pub fn save(&self, path: &Path) -> Result<(), RetrievalError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = IndexFile {
            dimensions: self.embedder.dimensions(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&file)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), entries = self.entries.len(), "saved vector index");
        Ok(())
    }

    /// Load a persisted index, checking that it matches the embedder.
    pub fn load(
        path: &Path,
        embedder: Arc<dyn Embedder>,
        min_score: f32,
    ) -> Result<Self, RetrievalError> {
        if !path.exists() {
            return Err(RetrievalError::IndexNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let file: IndexFile = serde_json::from_str(&content)?;
        if file.dimensions != embedder.dimensions() {
            return Err(RetrievalError::DimensionMismatch {
                index: file.dimensions,
                embedder: embedder.dimensions(),
            });
        }
        info!(path = %path.display(), entries = file.entries.len(), "loaded vector index");
        Ok(Self {
            embedder,
            min_score,
            entries: file.entries,
        })
    }
}

#[async_trait]
impl Retriever for VectorStore {
    async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedDocument>, RetrievalError> {
        Ok(self.search(query, k))
    }
}
