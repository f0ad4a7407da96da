//! SearxNG search backend
//!
//! Queries a SearxNG instance's JSON API (`GET /search?q=…&format=json`)
//! and maps the results to `SearchHit` triples.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use wikismith_kernel::{PipelineError, PipelineResult, SearchHit, SearchProvider};

/// SearxNG backend configuration
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct SearxConfig {
    /// Base URL of the SearxNG instance (no trailing `/search`)
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    20
}

impl SearxConfig {
    /// Create a config for the given instance URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// SearxNG search provider
pub struct SearxProvider {
    config: SearxConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl SearxProvider {
    /// Create a provider for the configured instance.
    pub fn new(config: SearxConfig) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::config(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn hits_from_response(response: SearxResponse, limit: usize) -> Vec<SearchHit> {
        response
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(limit)
            .map(|r| SearchHit::new(r.title, r.url, r.content))
            .collect()
    }
}

#[async_trait]
impl SearchProvider for SearxProvider {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(&self, query: &str, limit: usize) -> PipelineResult<Vec<SearchHit>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        debug!(%query, limit, "searxng query");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| PipelineError::search(e.to_string()))?
            .error_for_status()
            .map_err(|e| PipelineError::search(e.to_string()))?;

        let parsed: SearxResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::search(format!("invalid searxng response: {e}")))?;

        Ok(Self::hits_from_response(parsed, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_from_response_maps_and_truncates() {
        let payload = r#"{
            "results": [
                {"title": "Rust Book", "url": "https://doc.rust-lang.org/book", "content": "ownership"},
                {"title": "Rustonomicon", "url": "https://doc.rust-lang.org/nomicon", "content": "unsafe"},
                {"title": "Missing url", "url": "", "content": "dropped"},
                {"title": "Over limit", "url": "https://example.com", "content": "cut"}
            ],
            "suggestions": ["ignored"]
        }"#;

        let parsed: SearxResponse = serde_json::from_str(payload).unwrap();
        let hits = SearxProvider::hits_from_response(parsed, 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://doc.rust-lang.org/book");
        assert_eq!(hits[1].title, "Rustonomicon");
    }

    #[test]
    fn test_response_with_missing_fields_still_parses() {
        let payload = r#"{"results": [{"url": "https://a.example"}]}"#;
        let parsed: SearxResponse = serde_json::from_str(payload).unwrap();
        let hits = SearxProvider::hits_from_response(parsed, 3);
        assert_eq!(hits[0].content, "");
    }
}
