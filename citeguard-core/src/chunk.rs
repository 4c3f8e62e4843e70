//! Document chunking strategies.

use serde::{Deserialize, Serialize};

/// A document chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub text: String,
    pub chunk_index: usize,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Chunking strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkingStrategy {
    FixedSize {
        chunk_size: usize,
        overlap: usize,
    },
    Recursive {
        separators: Vec<String>,
        chunk_size: usize,
        overlap: usize,
    },
}

impl Default for ChunkingStrategy {
    fn default() -> Self {
        Self::Recursive {
            separators: vec!["\n\n".into(), "\n".into(), ". ".into(), " ".into()],
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingStrategy {
    /// The default separators with article-specific size parameters.
    pub fn recursive(chunk_size: usize, overlap: usize) -> Self {
        Self::Recursive {
            separators: vec!["\n\n".into(), "\n".into(), ". ".into(), " ".into()],
            chunk_size,
            overlap,
        }
    }
}

/// Chunk text using the specified strategy.
pub fn chunk_text(text: &str, doc_id: &str, strategy: &ChunkingStrategy) -> Vec<Chunk> {
    match strategy {
        ChunkingStrategy::FixedSize {
            chunk_size,
            overlap,
        } => chunk_fixed(text, doc_id, *chunk_size, *overlap),
        ChunkingStrategy::Recursive {
            separators,
            chunk_size,
            overlap,
        } => chunk_recursive(text, doc_id, separators, *chunk_size, *overlap),
    }
}

fn chunk_fixed(text: &str, doc_id: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut idx = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk_text: String = chars[start..end].iter().collect();
        chunks.push(Chunk {
            id: format!("{doc_id}-chunk-{idx}"),
            document_id: doc_id.to_string(),
            text: chunk_text,
            chunk_index: idx,
            start_offset: start,
            end_offset: end,
        });
        idx += 1;
        if end >= chars.len() {
            break;
        }
        start = end.saturating_sub(overlap);
    }
    chunks
}

fn chunk_recursive(
    text: &str,
    doc_id: &str,
    separators: &[String],
    chunk_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    // Split by the first separator that actually divides the text, packing
    // parts up to chunk_size with a trailing-overlap carryover.
    for sep in separators {
        let parts: Vec<&str> = text.split(sep.as_str()).collect();
        if parts.len() > 1 {
            let mut chunks = Vec::new();
            let mut current = String::new();
            let mut idx = 0;
            let mut start_offset = 0;

            for part in parts {
                if current.len() + part.len() + sep.len() > chunk_size && !current.is_empty() {
                    chunks.push(Chunk {
                        id: format!("{doc_id}-chunk-{idx}"),
                        document_id: doc_id.to_string(),
                        text: current.trim().to_string(),
                        chunk_index: idx,
                        start_offset,
                        end_offset: start_offset + current.len(),
                    });
                    idx += 1;
                    // Keep overlap
                    let overlap_text = if current.len() > overlap {
                        current[current.len() - overlap..].to_string()
                    } else {
                        String::new()
                    };
                    start_offset += current.len() - overlap_text.len();
                    current = overlap_text;
                }
                if !current.is_empty() {
                    current.push_str(sep);
                }
                current.push_str(part);
            }
            if !current.trim().is_empty() {
                chunks.push(Chunk {
                    id: format!("{doc_id}-chunk-{idx}"),
                    document_id: doc_id.to_string(),
                    text: current.trim().to_string(),
                    chunk_index: idx,
                    start_offset,
                    end_offset: start_offset + current.len(),
                });
            }
            return chunks;
        }
    }
    // No separator divides the text
    chunk_fixed(text, doc_id, chunk_size, overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_fixed_respects_size() {
        let text = "abcdefghij".repeat(10);
        let chunks = chunk_fixed(&text, "doc1", 30, 5);
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 30));
        assert_eq!(chunks[0].document_id, "doc1");
    }

    #[test]
    fn test_chunk_fixed_overlap_repeats_tail() {
        let text = "0123456789abcdefghij";
        let chunks = chunk_fixed(text, "doc1", 10, 3);
        assert!(chunks.len() >= 2);
        let first_tail: String = chunks[0].text.chars().rev().take(3).collect();
        let second_head: String = chunks[1].text.chars().take(3).collect();
        let first_tail: String = first_tail.chars().rev().collect();
        assert_eq!(first_tail, second_head);
    }

    #[test]
    fn test_chunk_recursive_prefers_paragraphs() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk_text(text, "doc1", &ChunkingStrategy::default());
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
    }

    #[test]
    fn test_chunk_recursive_splits_long_text() {
        let text = (0..30)
            .map(|i| format!("Paragraph number {i} holds one small thought."))
            .collect::<Vec<_>>()
            .join("\n\n");
        let chunks = chunk_text(text.as_str(), "doc1", &ChunkingStrategy::recursive(300, 50));
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.len() <= 300, "chunk too large: {}", c.text.len());
        }
    }

    #[test]
    fn test_chunk_indices_are_sequential() {
        let text = "word ".repeat(500);
        let chunks = chunk_text(text.as_str(), "doc1", &ChunkingStrategy::recursive(200, 20));
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i);
            assert_eq!(c.id, format!("doc1-chunk-{i}"));
        }
    }

    #[test]
    fn test_unsplittable_text_falls_back_to_fixed() {
        let text = "x".repeat(250);
        let chunks = chunk_text(&text, "doc1", &ChunkingStrategy::recursive(100, 10));
        assert!(chunks.len() > 1);
    }
}
