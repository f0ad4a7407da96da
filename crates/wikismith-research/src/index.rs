//! Reference indexer
//!
//! Flattens every interview's citation map into reference documents and
//! bulk-inserts them into the store for section-time retrieval. Insert
//! errors are not caught here; the store layer owns that failure.

use crate::context::ResearchContext;
use crate::state::InterviewState;
use tracing::info;
use uuid::Uuid;
use wikismith_kernel::{Document, PipelineResult};

/// Persists cited references into the store.
pub struct ReferenceIndexer<'a> {
    ctx: &'a ResearchContext,
}

impl<'a> ReferenceIndexer<'a> {
    /// Create an indexer over the given context.
    pub fn new(ctx: &'a ResearchContext) -> Self {
        Self { ctx }
    }

    /// Index all citation maps; returns the number of documents added.
    pub async fn run(&self, interviews: &[InterviewState]) -> PipelineResult<usize> {
        let documents: Vec<Document> = interviews
            .iter()
            .flat_map(|interview| interview.references.iter())
            .map(|(url, content)| {
                Document::new(Uuid::new_v4().to_string(), content.clone()).with_source(url.clone())
            })
            .collect();

        let indexed = documents.len();
        self.ctx.store.add_documents(documents).await?;

        info!(indexed, "references indexed");
        Ok(indexed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use crate::outline::Editor;
    use std::sync::Arc;
    use wikismith_foundation::llm::mock::ScriptedProvider;
    use wikismith_foundation::search::StaticSearchProvider;
    use wikismith_foundation::store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore};
    use wikismith_kernel::ReferenceStore;

    fn interview_with_refs(refs: &[(&str, &str)]) -> InterviewState {
        let mut interview = InterviewState::seeded(
            Editor {
                name: "yuki".into(),
                affiliation: String::new(),
                role: String::new(),
                persona: "internals".into(),
            },
            "topic",
        );
        for (url, content) in refs {
            interview
                .references
                .insert(url.to_string(), content.to_string());
        }
        interview
    }

    #[tokio::test]
    async fn test_indexer_flattens_all_interviews() {
        let store = Arc::new(VectorReferenceStore::new(
            Arc::new(HashEmbedder::default()),
            InMemoryVectorStore::cosine(),
        ));
        let context = ResearchContext::new(
            Arc::new(ScriptedProvider::new(vec![])),
            Arc::new(StaticSearchProvider::new()),
            store.clone(),
        )
        .with_config(ResearchConfig::fast());

        let interviews = vec![
            interview_with_refs(&[("https://a.example", "ownership text")]),
            interview_with_refs(&[
                ("https://b.example", "borrowing text"),
                ("https://c.example", "lifetime text"),
            ]),
        ];

        let indexed = ReferenceIndexer::new(&context).run(&interviews).await.unwrap();
        assert_eq!(indexed, 3);
        assert_eq!(store.count().await.unwrap(), 3);

        let results = store.similarity_search("borrowing", 1).await.unwrap();
        assert_eq!(results[0].document.source(), Some("https://b.example"));
    }

    #[tokio::test]
    async fn test_indexer_with_no_references() {
        let store = Arc::new(VectorReferenceStore::new(
            Arc::new(HashEmbedder::default()),
            InMemoryVectorStore::cosine(),
        ));
        let context = ResearchContext::new(
            Arc::new(ScriptedProvider::new(vec![])),
            Arc::new(StaticSearchProvider::new()),
            store,
        )
        .with_config(ResearchConfig::fast());

        let indexed = ReferenceIndexer::new(&context)
            .run(&[interview_with_refs(&[])])
            .await
            .unwrap();
        assert_eq!(indexed, 0);
    }
}
