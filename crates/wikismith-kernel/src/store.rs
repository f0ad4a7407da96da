//! Reference store contracts
//!
//! Data types and traits for the citation/reference store: documents with
//! source metadata, embedding vectors, and similarity search. Concrete
//! implementations (in-memory vector store, embedders) live in
//! `wikismith-foundation`.

use crate::error::PipelineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key under which a document's source URL is stored.
pub const SOURCE_KEY: &str = "source";

/// A reference document persisted for later retrieval.
///
/// Created from a cited search result: the fetched page content plus a
/// `source` metadata entry holding the URL it was cited from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document
    pub id: String,
    /// The text content
    pub content: String,
    /// Arbitrary metadata (`source` URL, section title, etc.)
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach the source URL this document was cited from
    pub fn with_source(self, url: impl Into<String>) -> Self {
        self.with_metadata(SOURCE_KEY, url)
    }

    /// The source URL, if one was attached
    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).map(String::as_str)
    }
}

/// A document returned from a similarity search, with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// The matched document
    pub document: Document,
    /// Similarity score (higher is more similar, range depends on metric)
    pub score: f32,
}

/// Similarity metric used for comparing embedding vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SimilarityMetric {
    /// Cosine similarity (angle between vectors)
    #[default]
    Cosine,
    /// Euclidean distance (L2, converted so higher is more similar)
    Euclidean,
    /// Dot product
    DotProduct,
}

/// Turns text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> PipelineResult<Vec<f32>>;

    /// Embed several texts. The default implementation embeds one by one.
    async fn embed_batch(&self, texts: &[String]) -> PipelineResult<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Dimensionality of produced vectors.
    fn dimensions(&self) -> usize;
}

/// Abstract interface for vector storage and similarity search.
///
/// Stores `(id, embedding, document)` entries and retrieves the most
/// similar ones given a query vector.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or update a document with its embedding.
    ///
    /// If a document with the same id already exists, it is replaced.
    async fn upsert(&mut self, document: Document, embedding: Vec<f32>) -> PipelineResult<()>;

    /// Insert or update multiple documents at once.
    async fn upsert_batch(
        &mut self,
        entries: Vec<(Document, Vec<f32>)>,
    ) -> PipelineResult<()> {
        for (document, embedding) in entries {
            self.upsert(document, embedding).await?;
        }
        Ok(())
    }

    /// Search for the most similar documents to the query embedding.
    ///
    /// Returns up to `top_k` results sorted by similarity score (highest
    /// first). If `threshold` is given, results below it are dropped.
    async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        threshold: Option<f32>,
    ) -> PipelineResult<Vec<ScoredDocument>>;

    /// Number of stored documents.
    async fn count(&self) -> PipelineResult<usize>;

    /// Remove all documents.
    async fn clear(&mut self) -> PipelineResult<()>;

    /// The similarity metric used by this store.
    fn similarity_metric(&self) -> SimilarityMetric;
}

/// Document-level store used by the pipelines.
///
/// Writes are append-only from the pipelines' point of view: cited
/// reference documents are added, never updated in place. The store is
/// shared by interior mutability so stages can hold it behind an `Arc`.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Bulk-insert reference documents.
    async fn add_documents(&self, documents: Vec<Document>) -> PipelineResult<()>;

    /// Similarity search by query text.
    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> PipelineResult<Vec<ScoredDocument>>;

    /// Number of stored documents.
    async fn count(&self) -> PipelineResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_builder() {
        let doc = Document::new("doc-1", "Ownership moves values.")
            .with_source("https://doc.rust-lang.org/book/ch04")
            .with_metadata("section", "ownership");

        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.source(), Some("https://doc.rust-lang.org/book/ch04"));
        assert_eq!(doc.metadata.get("section").unwrap(), "ownership");
    }

    #[test]
    fn test_document_without_source() {
        let doc = Document::new("doc-2", "no source attached");
        assert_eq!(doc.source(), None);
    }

    #[test]
    fn test_similarity_metric_default() {
        assert_eq!(SimilarityMetric::default(), SimilarityMetric::Cosine);
    }
}
