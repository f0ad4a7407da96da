//! `wikismith run` - execute the research pipeline

use super::AppConfig;
use anyhow::Context;
use colored::Colorize;
use std::sync::Arc;
use tracing::info;
use wikismith_foundation::llm::openai::OpenAIProvider;
use wikismith_foundation::search::{SearchRouter, SearxProvider};
use wikismith_foundation::store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore};
use wikismith_research::{ResearchContext, ResearchPipeline};

/// Run the pipeline for `topic` using the configuration at `config_path`.
pub async fn run(topic: &str, config_path: &str, output: Option<&str>) -> anyhow::Result<()> {
    let config: AppConfig = wikismith_kernel::config::load_with_env(config_path, "WIKISMITH")
        .with_context(|| format!("failed to load config from {config_path}"))?;

    let llm = Arc::new(OpenAIProvider::from_llm_config(&config.llm));
    let searx = Arc::new(SearxProvider::new(config.search.clone())?);
    let search = Arc::new(SearchRouter::new(searx));
    let store = Arc::new(VectorReferenceStore::new(
        Arc::new(HashEmbedder::default()),
        InMemoryVectorStore::cosine(),
    ));

    let ctx = ResearchContext::new(llm, search, store).with_config(config.research);
    let pipeline = ResearchPipeline::new(ctx);

    println!("{} {}", "Researching:".bold(), topic);
    let state = pipeline.run(topic).await?;

    let article = state
        .article
        .as_ref()
        .context("pipeline finished without an article")?;

    let path = output.map(str::to_string).unwrap_or_else(|| {
        format!(
            "article-{}.md",
            chrono::Local::now().format("%Y-%m-%d-%H%M%S")
        )
    });
    std::fs::write(&path, &article.content)
        .with_context(|| format!("failed to write article to {path}"))?;

    info!(
        sections = state.sections.len(),
        references = state.references_indexed,
        footnotes = article.footnotes.len(),
        "article written"
    );
    println!(
        "{} {} ({} sections, {} footnotes)",
        "Article written to".green().bold(),
        path,
        state.sections.len(),
        article.footnotes.len()
    );
    Ok(())
}
