//! Text chunking
//!
//! Index building splits documents into overlapping fixed-size windows
//! before embedding, matching what hosted index builders do internally.

use crate::data::{Chunk, Document};
use anyhow::Result;

/// Splits a document into chunks.
pub trait Chunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>>;
}

/// Chunking parameters, in characters.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 50,
        }
    }
}

/// Sliding-window chunker with configurable overlap.
pub struct OverlappingChunker {
    config: ChunkConfig,
}

impl OverlappingChunker {
    /// The overlap must leave the window room to advance; an overlap at or
    /// beyond the chunk size is clamped to `chunk_size - 1`.
    pub fn new(mut config: ChunkConfig) -> Self {
        config.chunk_size = config.chunk_size.max(1);
        if config.chunk_overlap >= config.chunk_size {
            let clamped = config.chunk_size - 1;
            tracing::warn!(
                "Chunk overlap {} >= chunk size {}; clamping overlap to {}",
                config.chunk_overlap,
                config.chunk_size,
                clamped
            );
            config.chunk_overlap = clamped;
        }
        Self { config }
    }
}

impl Default for OverlappingChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

impl Chunker for OverlappingChunker {
    fn chunk(&self, document: &Document) -> Result<Vec<Chunk>> {
        let chars: Vec<char> = document.content.chars().collect();
        let mut chunks = Vec::new();

        if chars.is_empty() {
            return Ok(chunks);
        }

        // Always >= 1 after the clamp in `new`
        let step = self.config.chunk_size - self.config.chunk_overlap;
        let mut start = 0;
        let mut chunk_index = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());
            let body: String = chars[start..end].iter().collect();
            chunks.push(Chunk::new(&document.id, body, chunk_index));
            chunk_index += 1;
            start += step;
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document::new("test_doc", "test.txt", content, "txt")
    }

    #[test]
    fn test_chunks_respect_size() {
        let chunker = OverlappingChunker::new(ChunkConfig {
            chunk_size: 20,
            chunk_overlap: 5,
        });
        let chunks = chunker
            .chunk(&doc("Hello world! This is a test document with some content."))
            .unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 20);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = OverlappingChunker::new(ChunkConfig {
            chunk_size: 10,
            chunk_overlap: 4,
        });
        let chunks = chunker.chunk(&doc("abcdefghijklmnopqrstuvwxyz")).unwrap();

        assert!(chunks.len() >= 2);
        let first: String = chunks[0].content.chars().skip(6).collect();
        assert!(chunks[1].content.starts_with(&first));
    }

    #[test]
    fn test_oversized_overlap_still_covers_whole_document() {
        let chunker = OverlappingChunker::new(ChunkConfig {
            chunk_size: 8,
            chunk_overlap: 12,
        });
        let content = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunker.chunk(&doc(content)).unwrap();

        // With the overlap clamped the window advances one char per chunk,
        // so the last character is reached rather than truncated away.
        assert!(chunks.iter().any(|c| c.content.ends_with('z')));
        let rebuilt: String = chunks
            .iter()
            .map(|c| c.content.chars().next().unwrap())
            .collect();
        assert!(content.starts_with(&rebuilt[..rebuilt.len().min(content.len())]));
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let chunks = OverlappingChunker::default().chunk(&doc("")).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_ids_are_sequential() {
        let chunker = OverlappingChunker::new(ChunkConfig {
            chunk_size: 5,
            chunk_overlap: 0,
        });
        let chunks = chunker.chunk(&doc("aaaaabbbbbccccc")).unwrap();

        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["test_doc_0", "test_doc_1", "test_doc_2"]);
    }
}
