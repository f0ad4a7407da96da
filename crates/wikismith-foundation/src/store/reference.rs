//! Document-level reference store
//!
//! Composes an embedder with a vector store behind the kernel
//! `ReferenceStore` trait. This is the store the Reference Indexer writes
//! cited documents into and the Section Writer retrieves from.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use wikismith_kernel::{
    Document, Embedder, PipelineResult, ReferenceStore, ScoredDocument, VectorStore,
};

/// Reference store backed by an embedder and an in-process vector store.
///
/// Writes are append-only: documents are added, never updated in place.
/// Interior mutability lets the pipeline stages share it behind an `Arc`.
pub struct VectorReferenceStore<S: VectorStore> {
    embedder: Arc<dyn Embedder>,
    store: RwLock<S>,
}

impl<S: VectorStore> VectorReferenceStore<S> {
    /// Create a reference store over the given embedder and vector store.
    pub fn new(embedder: Arc<dyn Embedder>, store: S) -> Self {
        Self {
            embedder,
            store: RwLock::new(store),
        }
    }
}

#[async_trait]
impl<S: VectorStore> ReferenceStore for VectorReferenceStore<S> {
    async fn add_documents(&self, documents: Vec<Document>) -> PipelineResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries = documents.into_iter().zip(embeddings).collect();
        let mut store = self.store.write().await;
        store.upsert_batch(entries).await
    }

    async fn similarity_search(
        &self,
        query: &str,
        top_k: usize,
    ) -> PipelineResult<Vec<ScoredDocument>> {
        let query_embedding = self.embedder.embed(query).await?;
        let store = self.store.read().await;
        store.search(&query_embedding, top_k, None).await
    }

    async fn count(&self) -> PipelineResult<usize> {
        let store = self.store.read().await;
        store.count().await
    }
}
