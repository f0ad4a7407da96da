//! Section writer
//!
//! Drafts each outline section against references retrieved from the
//! store. Retrieval is retried on failure and then degrades to an empty
//! document context: a section is always produced, with or without
//! references. Sections have no cross-ordering dependency.

use crate::context::ResearchContext;
use crate::outline::{Outline, WikiSection};
use crate::prompts;
use tracing::{error, info, warn};
use wikismith_foundation::llm::types::ChatCompletionRequest;
use wikismith_kernel::{PipelineResult, ScoredDocument, StructuredPayload};

/// Writes every section of the refined outline.
pub struct SectionWriter<'a> {
    ctx: &'a ResearchContext,
}

impl<'a> SectionWriter<'a> {
    /// Create a writer over the given context.
    pub fn new(ctx: &'a ResearchContext) -> Self {
        Self { ctx }
    }

    /// Draft all sections of `outline`, in outline order.
    pub async fn run(&self, topic: &str, outline: &Outline) -> PipelineResult<Vec<WikiSection>> {
        let mut sections = Vec::with_capacity(outline.sections.len());
        for section in &outline.sections {
            sections.push(self.write_section(topic, outline, &section.title).await?);
        }
        info!(sections = sections.len(), "sections written");
        Ok(sections)
    }

    async fn write_section(
        &self,
        topic: &str,
        outline: &Outline,
        section_title: &str,
    ) -> PipelineResult<WikiSection> {
        let docs = self.retrieve_docs(topic, section_title).await;

        let request = ChatCompletionRequest::new()
            .system(prompts::section_system(
                &outline.as_str(topic),
                &docs,
                WikiSection::format_instructions(),
            ))
            .user(prompts::section_user(section_title));

        let (section, _) = self
            .ctx
            .executor(self.ctx.config.section_policy())
            .chat_structured::<WikiSection>(request)
            .await?;
        Ok(section)
    }

    /// Retrieve and format reference documents for one section.
    ///
    /// Retries on store failure up to the configured budget; exhausting
    /// it returns an empty context instead of failing the section.
    async fn retrieve_docs(&self, topic: &str, section_title: &str) -> String {
        let attempts = self.ctx.config.retrieval_attempts.max(1);
        let query = format!("{topic}: {section_title}");

        for attempt in 0..attempts {
            match self
                .ctx
                .store
                .similarity_search(&query, self.ctx.config.retrieval_top_k)
                .await
            {
                Ok(documents) => return format_documents(&documents),
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        %query,
                        error = %e,
                        "reference retrieval failed"
                    );
                    if attempt + 1 < attempts {
                        tokio::time::sleep(std::time::Duration::from_millis(
                            self.ctx.config.retrieval_backoff_ms,
                        ))
                        .await;
                    }
                }
            }
        }

        error!(
            %query,
            attempts,
            "reference retrieval exhausted, writing section without documents"
        );
        String::new()
    }
}

fn format_documents(documents: &[ScoredDocument]) -> String {
    documents
        .iter()
        .map(|scored| {
            format!(
                "<Document href=\"{}\"/>\n{}\n</Document>",
                scored.document.source().unwrap_or("unknown"),
                scored.document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
