//! CLI subcommands

pub mod generate;
pub mod run;

use serde::{Deserialize, Serialize};
use wikismith_foundation::llm::provider::LLMConfig;
use wikismith_foundation::search::SearxConfig;
use wikismith_research::ResearchConfig;

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model endpoint configuration
    pub llm: LLMConfig,
    /// Search backend configuration
    pub search: SearxConfig,
    /// Pipeline configuration
    #[serde(default)]
    pub research: ResearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LLMConfig::openai_compatible(
                "https://api.openai.com/v1",
                "${OPENAI_API_KEY}",
                "gpt-4o-mini",
            ),
            search: SearxConfig::new("http://localhost:8080"),
            research: ResearchConfig::default(),
        }
    }
}
