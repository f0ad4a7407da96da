//! Web search contracts
//!
//! The pipelines never talk to a search engine directly; they go through
//! the [`SearchProvider`] trait. Concrete backends (SearxNG HTTP, static
//! fixtures for tests) live in `wikismith-foundation`.

use crate::error::PipelineResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One search result: title, URL and retrieved content snippet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchHit {
    /// Result title
    pub title: String,
    /// Result URL
    pub url: String,
    /// Retrieved content / snippet
    pub content: String,
}

impl SearchHit {
    /// Create a new search hit
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// A pluggable web search backend.
///
/// `search` returns an ordered list of hits or an error on transport
/// failure. Callers that fan a batch of queries out are expected to drop
/// individual failures rather than abort the batch.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Backend name (used by the backend selector).
    fn name(&self) -> &str;

    /// Run a free-text query, returning at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> PipelineResult<Vec<SearchHit>>;
}
