//! Explicit run context
//!
//! One context value is constructed per pipeline run and passed by
//! reference through every stage: the model provider, the search
//! backend, the reference store, and the configuration. No stage reaches
//! for ambient global state.

use crate::config::ResearchConfig;
use std::sync::Arc;
use wikismith_foundation::llm::provider::LLMProvider;
use wikismith_foundation::llm::retry::RetryExecutor;
use wikismith_foundation::llm::types::RetryPolicy;
use wikismith_kernel::{ReferenceStore, SearchProvider};

/// Service handles and configuration for one pipeline run.
pub struct ResearchContext {
    /// Model provider handle
    pub llm: Arc<dyn LLMProvider>,
    /// Search backend handle
    pub search: Arc<dyn SearchProvider>,
    /// Reference store handle
    pub store: Arc<dyn ReferenceStore>,
    /// Pipeline configuration
    pub config: ResearchConfig,
}

impl ResearchContext {
    /// Build a context from explicit service handles.
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        search: Arc<dyn SearchProvider>,
        store: Arc<dyn ReferenceStore>,
    ) -> Self {
        Self {
            llm,
            search,
            store,
            config: ResearchConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ResearchConfig) -> Self {
        self.config = config;
        self
    }

    /// A retry executor over the model provider for one call site.
    pub fn executor(&self, policy: RetryPolicy) -> RetryExecutor {
        RetryExecutor::new(self.llm.clone(), policy)
    }
}
