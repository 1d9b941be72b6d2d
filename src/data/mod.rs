//! Document model, loading, and chunking
//!
//! Documents come either from the documents directory (plain text, markdown,
//! optionally PDF) or from the structured parsing service. Indexing splits
//! them into overlapping chunks first.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod chunkers;
pub mod loaders;

pub use chunkers::{ChunkConfig, Chunker, OverlappingChunker};
pub use loaders::{DocumentLoader, MarkdownLoader, MultiFormatLoader, TextLoader};

/// A loaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, derived from the source path.
    pub id: String,
    /// Source path or service identifier.
    pub source: String,
    /// Full text content.
    pub content: String,
    /// File type tag: txt, md, pdf, or the parser's result type.
    pub file_type: String,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        content: impl Into<String>,
        file_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            content: content.into(),
            file_type: file_type.into(),
        }
    }

    /// Compact summary for inline display.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "source": self.source,
            "file_type": self.file_type,
            "content_chars": self.content.chars().count(),
        })
    }
}

/// A chunk of a document, the unit stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier: `<document_id>_<chunk_index>`.
    pub id: String,
    /// Parent document ID.
    pub document_id: String,
    /// Chunk text.
    pub content: String,
    /// Chunk position within the document.
    pub chunk_index: usize,
}

impl Chunk {
    pub fn new(
        document_id: &str,
        content: impl Into<String>,
        chunk_index: usize,
    ) -> Self {
        Self {
            id: format!("{}_{}", document_id, chunk_index),
            document_id: document_id.to_string(),
            content: content.into(),
            chunk_index,
        }
    }
}

/// Derive a stable document ID from a path.
pub fn document_id_for(path: &Path) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    path.to_string_lossy().hash(&mut hasher);
    format!("doc_{:x}", hasher.finish())
}
