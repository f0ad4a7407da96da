//! Search backend router
//!
//! Dispatches queries to a named backend. Callers pass an optional
//! backend selector; `None` uses the configured default.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use wikismith_kernel::{PipelineError, PipelineResult, SearchHit, SearchProvider};

/// Routes search calls to registered backends by name.
pub struct SearchRouter {
    providers: HashMap<String, Arc<dyn SearchProvider>>,
    default_backend: String,
}

impl SearchRouter {
    /// Create a router whose default backend is `default`.
    ///
    /// The default provider is registered under its own name.
    pub fn new(default: Arc<dyn SearchProvider>) -> Self {
        let default_backend = default.name().to_string();
        let mut providers: HashMap<String, Arc<dyn SearchProvider>> = HashMap::new();
        providers.insert(default_backend.clone(), default);
        Self {
            providers,
            default_backend,
        }
    }

    /// Register an additional backend under its own name.
    pub fn with_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// Run a query on the selected backend (`None` = default).
    pub async fn search_on(
        &self,
        backend: Option<&str>,
        query: &str,
        limit: usize,
    ) -> PipelineResult<Vec<SearchHit>> {
        let name = backend.unwrap_or(&self.default_backend);
        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| PipelineError::search(format!("unknown search backend: {name}")))?;
        provider.search(query, limit).await
    }
}

#[async_trait]
impl SearchProvider for SearchRouter {
    fn name(&self) -> &str {
        &self.default_backend
    }

    async fn search(&self, query: &str, limit: usize) -> PipelineResult<Vec<SearchHit>> {
        self.search_on(None, query, limit).await
    }
}
