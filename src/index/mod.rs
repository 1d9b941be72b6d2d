//! Embedding and vector indexing
//!
//! Provides a trait-based embedding interface with a deterministic token-hash
//! backend (no model download required) and a persistable HNSW vector index.

use anyhow::Result;

pub mod vector;

pub use vector::{IndexMetadata, QueryEngine, QueryResponse, ScoredChunk, Source, VectorIndex};

/// An embedding vector.
pub type Embedding = Vec<f32>;

/// Embedding backend contract.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed multiple texts.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// L2-normalize an embedding in place.
pub fn normalize_embedding(embedding: &mut Embedding) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in embedding.iter_mut() {
            *value /= norm;
        }
    }
}

/// Cosine similarity between two embeddings.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Deterministic bag-of-tokens embedder. Each token hashes to a position in
/// the vector; identical text always embeds identically, which keeps render
/// passes reproducible without any model weights.
pub struct TokenEmbedder {
    model_name: String,
    dimension: usize,
}

impl TokenEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            model_name: "token-hash".to_string(),
            dimension,
        }
    }
}

impl Default for TokenEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl Embedder for TokenEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut embedding = vec![0.0; self.dimension];

        let tokens: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|s| !s.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(embedding);
        }

        for token in &tokens {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.dimension;
            embedding[idx] += 1.0;
        }

        let total = tokens.len() as f32;
        for value in embedding.iter_mut() {
            *value /= total;
        }

        normalize_embedding(&mut embedding);
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_embedder_is_deterministic() {
        let embedder = TokenEmbedder::new(64);
        let a = embedder.embed("the quick brown fox").unwrap();
        let b = embedder.embed("the quick brown fox").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_embedder_normalizes() {
        let embedder = TokenEmbedder::new(64);
        let embedding = embedder.embed("hello world").unwrap();
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_embeds_to_zero() {
        let embedder = TokenEmbedder::new(16);
        let embedding = embedder.embed("   ").unwrap();
        assert!(embedding.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);

        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);

        // Mismatched dimensions degrade to zero
        assert_eq!(cosine_similarity(&a, &vec![1.0]), 0.0);
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let embedder = TokenEmbedder::new(128);
        let fox = embedder.embed("the quick brown fox jumps").unwrap();
        let fox_again = embedder.embed("a quick brown fox").unwrap();
        let unrelated = embedder.embed("tuition fees tax slip").unwrap();

        assert!(
            cosine_similarity(&fox, &fox_again) > cosine_similarity(&fox, &unrelated)
        );
    }
}
