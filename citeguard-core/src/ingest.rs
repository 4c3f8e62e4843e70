//! Corpus ingestion — turn collected article files into an embedded index.
//!
//! Walks a directory of collected `.txt` files, strips the collector's
//! metadata header, chunks each article, and adds every chunk to a
//! [`VectorStore`]. A file that cannot be read is logged and skipped; it
//! never aborts the batch.

use crate::chunk::{ChunkingStrategy, chunk_text};
use crate::error::AssistantError;
use crate::retrieval::VectorStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Per-run ingestion statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: usize,
}

/// Ingests collected documents into a vector store.
pub struct DocumentIngestor {
    strategy: ChunkingStrategy,
}

impl DocumentIngestor {
    pub fn new(strategy: ChunkingStrategy) -> Self {
        Self { strategy }
    }

    /// Ingest a single collected file; returns the number of chunks added.
    pub async fn ingest_file(
        &self,
        path: &Path,
        store: &mut VectorStore,
    ) -> Result<usize, AssistantError> {
        let content = tokio::fs::read_to_string(path).await?;
        let (source, url, body) = parse_collected(&content);

        let source = source
            .map(String::from)
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let doc_id = uuid::Uuid::new_v4().to_string();
        let chunks = chunk_text(body, &doc_id, &self.strategy);
        for chunk in &chunks {
            store.add(&source, url, &chunk.text);
        }
        Ok(chunks.len())
    }

    /// Ingest every `.txt` file under `dir`.
    pub async fn ingest_directory(
        &self,
        dir: &Path,
        store: &mut VectorStore,
    ) -> Result<IngestStats, AssistantError> {
        let mut stats = IngestStats::default();

        for entry in walkdir::WalkDir::new(dir).into_iter().flatten() {
            if !entry.file_type().is_file() {
                continue;
            }
            let is_txt = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext == "txt");
            if !is_txt {
                continue;
            }
            match self.ingest_file(entry.path(), store).await {
                Ok(chunks) => {
                    stats.documents += 1;
                    stats.chunks += chunks;
                }
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping file");
                    stats.skipped += 1;
                }
            }
        }

        info!(
            documents = stats.documents,
            chunks = stats.chunks,
            skipped = stats.skipped,
            "ingested corpus"
        );
        Ok(stats)
    }
}

/// Split a collected file into its metadata header and body.
///
/// The collector writes a four-line header (`Source:`, `URL:`, `Fetched:`,
/// blank). Files without the header are treated as all body.
fn parse_collected(content: &str) -> (Option<&str>, Option<&str>, &str) {
    if !content.starts_with("Source: ") {
        return (None, None, content);
    }
    let mut source = None;
    let mut url = None;
    let mut offset = 0;
    for (i, line) in content.lines().take(4).enumerate() {
        if let Some(rest) = line.strip_prefix("Source: ") {
            source = Some(rest.trim());
        } else if let Some(rest) = line.strip_prefix("URL: ") {
            url = Some(rest.trim());
        }
        // +1 for the newline; the 4th line is the blank separator.
        offset += line.len() + 1;
        if i == 3 {
            break;
        }
    }
    let body = content.get(offset..).unwrap_or("");
    (source, url, body)
}
