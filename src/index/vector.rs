//! Persistable vector index
//!
//! Chunks documents, embeds the chunks, and serves approximate
//! nearest-neighbor search via hnsw_rs. Persistence writes chunks and
//! metadata as JSON; the HNSW graph itself is rebuilt from re-embedded
//! chunks on load.

use anyhow::{Context, Result};
use hnsw_rs::hnsw::{Hnsw, Neighbour};
use hnsw_rs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::data::{Chunk, Chunker, Document, OverlappingChunker};
use crate::index::{Embedder, Embedding};
use crate::llm::{CompletionClient, PromptTemplate};

const HNSW_MAX_CONNECTIONS: usize = 16;
const HNSW_MAX_LAYERS: usize = 16;
const HNSW_EF_CONSTRUCTION: usize = 200;
const HNSW_EF_SEARCH: usize = 30;

/// Index metadata persisted alongside the chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Embedding model the index was built with.
    pub model_name: String,
    /// Embedding dimension.
    pub dimension: usize,
    /// Number of source documents.
    pub num_documents: usize,
    /// Number of indexed chunks.
    pub num_chunks: usize,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
    /// 1-indexed rank in the result list.
    pub rank: usize,
}

/// Source citation attached to a query answer.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub chunk_id: String,
    pub document_id: String,
    pub score: f32,
    pub snippet: String,
}

/// Answer plus the retrieved context it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
}

impl QueryResponse {
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"answer": self.answer}))
    }
}

/// In-memory vector index over chunked documents.
pub struct VectorIndex {
    hnsw: Hnsw<'static, f32, DistCosine>,
    /// Point id in the HNSW graph == position in this vec.
    chunks: Vec<Chunk>,
    embedder: Arc<dyn Embedder>,
    metadata: IndexMetadata,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("chunks", &self.chunks.len())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    /// Chunk, embed, and index a set of documents.
    pub fn from_documents(documents: &[Document], embedder: Arc<dyn Embedder>) -> Result<Self> {
        if documents.is_empty() {
            anyhow::bail!("Cannot build an index from zero documents");
        }

        let chunker = OverlappingChunker::default();
        let mut chunks = Vec::new();
        for document in documents {
            chunks.extend(chunker.chunk(document)?);
        }
        if chunks.is_empty() {
            anyhow::bail!("Documents contained no indexable text");
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        let metadata = IndexMetadata {
            model_name: embedder.model_name().to_string(),
            dimension: embedder.dimension(),
            num_documents: documents.len(),
            num_chunks: chunks.len(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        Self::build(chunks, &embeddings, embedder, metadata)
    }

    fn build(
        chunks: Vec<Chunk>,
        embeddings: &[Embedding],
        embedder: Arc<dyn Embedder>,
        metadata: IndexMetadata,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            anyhow::bail!(
                "Chunk count ({}) doesn't match embedding count ({})",
                chunks.len(),
                embeddings.len()
            );
        }

        tracing::debug!(
            "Building HNSW index: {} chunks, {} dimensions",
            chunks.len(),
            metadata.dimension
        );

        let hnsw: Hnsw<f32, DistCosine> = Hnsw::new(
            HNSW_MAX_CONNECTIONS,
            chunks.len(),
            HNSW_MAX_LAYERS,
            HNSW_EF_CONSTRUCTION,
            DistCosine,
        );

        for (point_id, embedding) in embeddings.iter().enumerate() {
            hnsw.insert((embedding.as_slice(), point_id));
        }

        Ok(Self {
            hnsw,
            chunks,
            embedder,
            metadata,
        })
    }

    /// Write chunks and metadata to `dir`. The HNSW graph is rebuilt from
    /// re-embedded chunks on [`VectorIndex::load`].
    pub fn persist(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory: {:?}", dir))?;

        let chunks_json = serde_json::to_string_pretty(&self.chunks)?;
        fs::write(dir.join("chunks.json"), chunks_json)?;

        let metadata_json = serde_json::to_string_pretty(&self.metadata)?;
        fs::write(dir.join("metadata.json"), metadata_json)?;

        tracing::info!("Persisted index ({} chunks) to {:?}", self.chunks.len(), dir);
        Ok(())
    }

    /// Load a persisted index, re-embedding its chunks to rebuild the graph.
    pub fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let metadata_json = fs::read_to_string(dir.join("metadata.json"))
            .with_context(|| format!("No persisted index at {:?}", dir))?;
        let metadata: IndexMetadata = serde_json::from_str(&metadata_json)
            .context("Failed to parse index metadata.json")?;

        if embedder.model_name() != metadata.model_name {
            tracing::warn!(
                "Embedder mismatch: index built with {}, loading with {}",
                metadata.model_name,
                embedder.model_name()
            );
        }

        let chunks_json = fs::read_to_string(dir.join("chunks.json"))
            .context("Failed to read index chunks.json")?;
        let chunks: Vec<Chunk> =
            serde_json::from_str(&chunks_json).context("Failed to parse index chunks.json")?;

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        tracing::debug!("Rebuilt index from {:?} ({} chunks)", dir, chunks.len());
        Self::build(chunks, &embeddings, embedder, metadata)
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    /// Compact summary for inline display.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.metadata.model_name,
            "dimension": self.metadata.dimension,
            "documents": self.metadata.num_documents,
            "chunks": self.metadata.num_chunks,
            "created_at": self.metadata.created_at,
        })
    }

    /// Retrieve the top-k most similar chunks for a query.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .context("Failed to embed query")?;

        let ef = HNSW_EF_SEARCH.max(top_k);
        let neighbours: Vec<Neighbour> =
            self.hnsw.search(query_embedding.as_slice(), top_k, ef);

        let results = neighbours
            .iter()
            .enumerate()
            .filter_map(|(rank, neighbour)| {
                self.chunks.get(neighbour.d_id).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    // hnsw_rs returns cosine distance; similarity = 1 - distance
                    score: 1.0 - neighbour.distance,
                    rank: rank + 1,
                })
            })
            .collect();

        Ok(results)
    }

    /// Wrap the index into a query engine with default retrieval settings.
    pub fn as_query_engine(&self, completion: Arc<dyn CompletionClient>) -> QueryEngine<'_> {
        QueryEngine {
            index: self,
            completion,
            top_k: 5,
            similarity_cutoff: None,
            template: PromptTemplate::qa_default(),
        }
    }
}

/// Retriever + synthesizer over a [`VectorIndex`].
pub struct QueryEngine<'a> {
    index: &'a VectorIndex,
    completion: Arc<dyn CompletionClient>,
    top_k: usize,
    similarity_cutoff: Option<f32>,
    template: PromptTemplate,
}

impl<'a> QueryEngine<'a> {
    /// Set the retrieval depth.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Drop retrieved chunks scoring below the cutoff.
    pub fn with_similarity_cutoff(mut self, cutoff: f32) -> Self {
        self.similarity_cutoff = Some(cutoff);
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Retrieve context, format the QA prompt, and complete it.
    pub fn query(&self, question: &str) -> Result<QueryResponse> {
        let mut hits = self.index.search(question, self.top_k)?;

        if let Some(cutoff) = self.similarity_cutoff {
            hits.retain(|hit| hit.score >= cutoff);
        }

        let context_str = hits
            .iter()
            .map(|hit| hit.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self.template.format(&context_str, question);
        let answer = self.completion.complete(&prompt)?;

        let sources = hits
            .iter()
            .map(|hit| Source {
                chunk_id: hit.chunk.id.clone(),
                document_id: hit.chunk.document_id.clone(),
                score: hit.score,
                snippet: truncate_snippet(&hit.chunk.content, 200),
            })
            .collect();

        Ok(QueryResponse { answer, sources })
    }
}

/// Truncate a snippet at a word boundary.
fn truncate_snippet(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    match truncated.rfind(' ') {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::TokenEmbedder;
    use crate::llm::MockCompletion;
    use tempfile::tempdir;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(TokenEmbedder::new(128))
    }

    fn sample_documents() -> Vec<Document> {
        vec![
            Document::new(
                "doc_rust",
                "data/rust.txt",
                "Rust is a systems programming language focused on safety.",
                "txt",
            ),
            Document::new(
                "doc_fees",
                "data/t2202.txt",
                "The tuition fees for the session total 8500 dollars.",
                "txt",
            ),
        ]
    }

    #[test]
    fn test_build_and_search() {
        let index = VectorIndex::from_documents(&sample_documents(), embedder()).unwrap();

        assert_eq!(index.metadata().num_documents, 2);
        let hits = index.search("tuition fees", 2).unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].chunk.document_id, "doc_fees");
        assert_eq!(hits[0].rank, 1);
    }

    #[test]
    fn test_empty_documents_rejected() {
        assert!(VectorIndex::from_documents(&[], embedder()).is_err());
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let index = VectorIndex::from_documents(&sample_documents(), embedder()).unwrap();
        index.persist(dir.path()).unwrap();

        let loaded = VectorIndex::load(dir.path(), embedder()).unwrap();
        assert_eq!(loaded.metadata().num_chunks, index.metadata().num_chunks);

        // Loaded index answers searches the same way
        let hits = loaded.search("systems programming", 1).unwrap();
        assert_eq!(hits[0].chunk.document_id, "doc_rust");
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = VectorIndex::load(&dir.path().join("nope"), embedder()).unwrap_err();
        assert!(format!("{:#}", err).contains("No persisted index"));
    }

    #[test]
    fn test_query_engine_answers_with_sources() {
        let index = VectorIndex::from_documents(&sample_documents(), embedder()).unwrap();
        let engine = index.as_query_engine(Arc::new(MockCompletion::new("8500 dollars")));

        let response = engine.query("How much are the tuition fees?").unwrap();
        assert_eq!(response.answer, "8500 dollars");
        assert!(!response.sources.is_empty());
        assert!(response.sources.iter().all(|s| !s.snippet.is_empty()));
    }

    #[test]
    fn test_similarity_cutoff_filters_sources() {
        let index = VectorIndex::from_documents(&sample_documents(), embedder()).unwrap();
        let engine = index
            .as_query_engine(Arc::new(MockCompletion::new("n/a")))
            .with_top_k(10)
            .with_similarity_cutoff(1.1); // above the maximum possible score

        let response = engine.query("anything").unwrap();
        assert!(response.sources.is_empty());
    }

    #[test]
    fn test_truncate_snippet_word_boundary() {
        let text = "This is a long piece of text that needs to be truncated";
        let truncated = truncate_snippet(text, 20);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 23);

        assert_eq!(truncate_snippet("short", 20), "short");
    }
}
