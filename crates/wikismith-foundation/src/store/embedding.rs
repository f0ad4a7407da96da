//! Embedder implementations
//!
//! Two embedders behind the kernel `Embedder` trait: one backed by a
//! model provider's embedding endpoint, and a deterministic local
//! feature-hashing embedder for offline runs and tests.

use crate::llm::provider::LLMProvider;
use crate::llm::types::EmbeddingRequest;
use async_trait::async_trait;
use std::sync::Arc;
use wikismith_kernel::{Embedder, PipelineError, PipelineResult};

/// Embedder backed by a model provider's embedding endpoint.
pub struct ProviderEmbedder {
    provider: Arc<dyn LLMProvider>,
    model: String,
    dimensions: usize,
}

impl ProviderEmbedder {
    /// Create a provider-backed embedder.
    ///
    /// `dimensions` must match what the named embedding model produces.
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider,
            model: model.into(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| PipelineError::store("embedding endpoint returned no vector"))
    }

    async fn embed_batch(&self, texts: &[String]) -> PipelineResult<Vec<Vec<f32>>> {
        let response = self
            .provider
            .embedding(EmbeddingRequest {
                model: self.model.clone(),
                input: texts.to_vec(),
            })
            .await
            .map_err(|e| PipelineError::store(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(PipelineError::store(format!(
                "embedding endpoint returned {} vectors for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }
        Ok(response.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Deterministic local embedder using token feature hashing.
///
/// Tokenizes on non-alphanumeric boundaries, hashes each lowercased token
/// into one of `dims` buckets with a sign bit, accumulates counts and
/// L2-normalizes. Texts sharing vocabulary land near each other, which is
/// all the retrieval stages need when no embedding endpoint is available.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    /// Create a hash embedder with the given dimensionality.
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn hash_token(token: &str) -> u64 {
        // FNV-1a
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dims];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = Self::hash_token(&token.to_lowercase());
            let bucket = (hash % self.dims as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::similarity::compute_similarity;
    use wikismith_kernel::SimilarityMetric;

    #[tokio::test]
    async fn test_hash_embedder_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("the rust ownership model").await.unwrap();
        let b = embedder.embed("the rust ownership model").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_hash_embedder_normalized() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("borrow checker lifetimes").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_hash_embedder_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::default();
        let v = embedder.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("rust ownership moves").await.unwrap();
        let related = embedder
            .embed("ownership in rust moves values between bindings")
            .await
            .unwrap();
        let unrelated = embedder
            .embed("pasta carbonara recipe with eggs")
            .await
            .unwrap();

        let sim_related = compute_similarity(&query, &related, SimilarityMetric::Cosine);
        let sim_unrelated = compute_similarity(&query, &unrelated, SimilarityMetric::Cosine);
        assert!(sim_related > sim_unrelated);
    }
}
