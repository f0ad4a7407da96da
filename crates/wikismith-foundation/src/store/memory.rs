//! In-memory vector store implementation
//!
//! A simple brute-force vector store backed by a HashMap. Suitable for
//! development, testing, and the document volumes a single research run
//! produces (tens to hundreds of cited references).

use crate::store::similarity::compute_similarity;
use async_trait::async_trait;
use std::collections::HashMap;
use wikismith_kernel::{
    Document, PipelineResult, ScoredDocument, SimilarityMetric, VectorStore,
};

/// In-memory vector store using brute-force similarity search.
///
/// Stores all documents in a HashMap and computes similarity against
/// every stored vector on each search.
pub struct InMemoryVectorStore {
    entries: HashMap<String, (Document, Vec<f32>)>,
    metric: SimilarityMetric,
}

impl InMemoryVectorStore {
    /// Create a new empty store with the given similarity metric.
    pub fn new(metric: SimilarityMetric) -> Self {
        Self {
            entries: HashMap::new(),
            metric,
        }
    }

    /// Create a new store using cosine similarity (the common default).
    pub fn cosine() -> Self {
        Self::new(SimilarityMetric::Cosine)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::cosine()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&mut self, document: Document, embedding: Vec<f32>) -> PipelineResult<()> {
        self.entries
            .insert(document.id.clone(), (document, embedding));
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: Option<f32>,
    ) -> PipelineResult<Vec<ScoredDocument>> {
        let mut scored: Vec<ScoredDocument> = self
            .entries
            .values()
            .map(|(document, embedding)| {
                let score = compute_similarity(embedding, query_embedding, self.metric);
                ScoredDocument {
                    document: document.clone(),
                    score,
                }
            })
            .filter(|result| threshold.is_none_or(|t| result.score >= t))
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> PipelineResult<usize> {
        Ok(self.entries.len())
    }

    async fn clear(&mut self) -> PipelineResult<()> {
        self.entries.clear();
        Ok(())
    }

    fn similarity_metric(&self) -> SimilarityMetric {
        self.metric
    }
}
