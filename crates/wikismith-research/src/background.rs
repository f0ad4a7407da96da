//! Background document retrieval
//!
//! Gathers reference digests for a list of related topics before the
//! editor perspectives are selected. Per-topic failures are tolerated;
//! the whole batch is retried a few times until at least one document is
//! gathered, then degrades to an empty digest block.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, warn};
use wikismith_kernel::{PipelineResult, SearchHit, SearchProvider};

/// Maximum characters kept per document digest.
const DIGEST_CHARS: usize = 1000;

/// Retrieves digests of background documents for related topics.
pub struct TopicDocRetriever {
    search: Arc<dyn SearchProvider>,
    max_rounds: u32,
    min_docs: usize,
}

impl TopicDocRetriever {
    /// Create a retriever over the given search backend.
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        Self {
            search,
            max_rounds: 3,
            min_docs: 1,
        }
    }

    /// Fetch and format background documents for `topics`.
    ///
    /// Returns one digest block per retrieved document, joined by blank
    /// lines. An empty string is returned when nothing could be
    /// gathered after all rounds.
    pub async fn retrieve(&self, topics: &[String]) -> PipelineResult<String> {
        if topics.is_empty() {
            return Ok(String::new());
        }

        let mut digests: Vec<String> = Vec::new();

        for round in 0..self.max_rounds {
            let outcomes = join_all(topics.iter().map(|topic| self.search.search(topic, 1))).await;

            for (topic, outcome) in topics.iter().zip(outcomes) {
                match outcome {
                    Ok(hits) if hits.is_empty() => {
                        warn!(%topic, "no background document found");
                    }
                    Ok(hits) => {
                        digests.extend(hits.iter().map(format_digest));
                    }
                    Err(e) => {
                        warn!(%topic, error = %e, "background retrieval failed");
                    }
                }
            }

            if digests.len() >= self.min_docs {
                break;
            }
            warn!(
                round = round + 1,
                gathered = digests.len(),
                needed = self.min_docs,
                "retrying background retrieval"
            );
        }

        if digests.is_empty() {
            error!("no background documents after {} rounds", self.max_rounds);
        }
        Ok(digests.join("\n\n"))
    }
}

/// One document rendered as a bounded digest block.
fn format_digest(hit: &SearchHit) -> String {
    let digest = format!("### {}\n\nSummary: {}", hit.title, hit.content);
    digest.chars().take(DIGEST_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikismith_foundation::search::StaticSearchProvider;

    #[tokio::test]
    async fn test_retrieve_formats_digests() {
        let search = Arc::new(
            StaticSearchProvider::new()
                .with_route(
                    "borrow",
                    vec![SearchHit::new("Borrowing", "https://b", "refs")],
                )
                .with_route(
                    "lifetimes",
                    vec![SearchHit::new("Lifetimes", "https://l", "scopes")],
                ),
        );
        let retriever = TopicDocRetriever::new(search);

        let formatted = retriever
            .retrieve(&["borrowing".to_string(), "lifetimes".to_string()])
            .await
            .unwrap();

        assert!(formatted.contains("### Borrowing"));
        assert!(formatted.contains("### Lifetimes"));
    }

    #[tokio::test]
    async fn test_retrieve_empty_topics() {
        let retriever = TopicDocRetriever::new(Arc::new(StaticSearchProvider::new()));
        let formatted = retriever.retrieve(&[]).await.unwrap();
        assert!(formatted.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_degrades_to_empty_after_rounds() {
        // No routes, no fallback: every round gathers nothing.
        let retriever = TopicDocRetriever::new(Arc::new(StaticSearchProvider::new()));
        let formatted = retriever
            .retrieve(&["unknown topic".to_string()])
            .await
            .unwrap();
        assert!(formatted.is_empty());
    }

    #[test]
    fn test_digest_truncated() {
        let hit = SearchHit::new("Long", "https://l", "x".repeat(5000));
        assert!(format_digest(&hit).chars().count() <= DIGEST_CHARS);
    }
}
