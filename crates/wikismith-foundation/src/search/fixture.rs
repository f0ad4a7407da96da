//! Static search backend for offline runs and tests
//!
//! Serves canned hits keyed by substring match on the query, with an
//! optional fallback set for everything else.

use async_trait::async_trait;
use std::collections::BTreeMap;
use wikismith_kernel::{PipelineResult, SearchHit, SearchProvider};

/// A search provider serving canned results.
///
/// Routes each query to the first registered entry whose key is a
/// case-insensitive substring of the query, falling back to the default
/// hits (empty unless set).
#[derive(Default)]
pub struct StaticSearchProvider {
    routes: BTreeMap<String, Vec<SearchHit>>,
    fallback: Vec<SearchHit>,
}

impl StaticSearchProvider {
    /// Create an empty provider (every query returns no hits).
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `hits` for queries containing `keyword`.
    pub fn with_route(mut self, keyword: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.routes.insert(keyword.into().to_lowercase(), hits);
        self
    }

    /// Serve `hits` for queries with no matching route.
    pub fn with_fallback(mut self, hits: Vec<SearchHit>) -> Self {
        self.fallback = hits;
        self
    }
}

#[async_trait]
impl SearchProvider for StaticSearchProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str, limit: usize) -> PipelineResult<Vec<SearchHit>> {
        let query = query.to_lowercase();
        let hits = self
            .routes
            .iter()
            .find(|(keyword, _)| query.contains(keyword.as_str()))
            .map(|(_, hits)| hits)
            .unwrap_or(&self.fallback);
        Ok(hits.iter().take(limit).cloned().collect())
    }
}
