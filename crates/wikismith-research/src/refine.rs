//! Outline refiner
//!
//! Merges every interview transcript into "Conversation with {editor}"
//! blocks and asks for a rewritten outline bound to the Outline shape.
//! The result replaces the prior outline wholesale. Zero transcripts is
//! a valid input: the model simply refines from the old outline alone.

use crate::context::ResearchContext;
use crate::outline::Outline;
use crate::prompts;
use crate::state::InterviewState;
use tracing::info;
use wikismith_foundation::llm::types::ChatCompletionRequest;
use wikismith_kernel::{PipelineError, PipelineResult, StructuredPayload};

/// Rewrites the outline from the interview transcripts.
pub struct OutlineRefiner<'a> {
    ctx: &'a ResearchContext,
}

/// Render one interview as a conversation block.
pub fn format_conversation(interview: &InterviewState) -> String {
    let convo = interview
        .messages
        .iter()
        .map(|m| {
            format!(
                "{}: {}",
                m.name.as_deref().unwrap_or("user"),
                m.text_content().unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("Conversation with {}\n\n{convo}", interview.editor.name)
}

impl<'a> OutlineRefiner<'a> {
    /// Create a refiner over the given context.
    pub fn new(ctx: &'a ResearchContext) -> Self {
        Self { ctx }
    }

    /// Produce the refined outline.
    pub async fn run(
        &self,
        topic: &str,
        old_outline: &Outline,
        interviews: &[InterviewState],
    ) -> PipelineResult<Outline> {
        let conversations = interviews
            .iter()
            .map(format_conversation)
            .collect::<Vec<_>>()
            .join("\n\n");

        let request = ChatCompletionRequest::new()
            .system(prompts::refine_system(
                topic,
                &old_outline.as_str(topic),
                Outline::format_instructions(),
            ))
            .user(prompts::refine_user(&conversations));

        let (refined, _) = self
            .ctx
            .executor(self.ctx.config.question_policy())
            .chat_structured::<Outline>(request)
            .await?;

        if refined.sections.is_empty() {
            return Err(PipelineError::invalid_output(
                "refined outline has no sections",
            ));
        }

        info!(sections = refined.sections.len(), "outline refined");
        Ok(refined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use crate::outline::{Editor, Section};
    use std::sync::Arc;
    use wikismith_foundation::llm::mock::ScriptedProvider;
    use wikismith_foundation::llm::types::{ChatCompletionResponse, ChatMessage, LLMResult};
    use wikismith_foundation::search::StaticSearchProvider;
    use wikismith_foundation::store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore};

    fn assistant(content: &str) -> LLMResult<ChatCompletionResponse> {
        Ok(ChatCompletionResponse {
            model: "scripted".to_string(),
            message: ChatMessage::assistant(content),
            usage: None,
        })
    }

    fn ctx(script: Vec<LLMResult<ChatCompletionResponse>>) -> ResearchContext {
        let store = Arc::new(VectorReferenceStore::new(
            Arc::new(HashEmbedder::default()),
            InMemoryVectorStore::cosine(),
        ));
        ResearchContext::new(
            Arc::new(ScriptedProvider::new(script)),
            Arc::new(StaticSearchProvider::new()),
            store,
        )
        .with_config(ResearchConfig::fast())
    }

    fn old_outline() -> Outline {
        Outline {
            sections: vec![Section {
                title: "Draft".to_string(),
                subsections: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn test_refiner_replaces_outline() {
        let context = ctx(vec![assistant(
            r#"{"sections": [{"title": "Background"}, {"title": "Borrowing"}]}"#,
        )]);

        let interview = InterviewState::seeded(
            Editor {
                name: "yuki".into(),
                affiliation: String::new(),
                role: String::new(),
                persona: "internals".into(),
            },
            "Rust ownership model",
        );

        let refined = OutlineRefiner::new(&context)
            .run("Rust ownership model", &old_outline(), &[interview])
            .await
            .unwrap();

        assert_eq!(refined.sections.len(), 2);
        assert_eq!(refined.sections[0].title, "Background");
    }

    #[tokio::test]
    async fn test_refiner_handles_zero_transcripts() {
        let context = ctx(vec![assistant(r#"{"sections": [{"title": "Solo"}]}"#)]);

        let refined = OutlineRefiner::new(&context)
            .run("Rust ownership model", &old_outline(), &[])
            .await
            .unwrap();
        assert_eq!(refined.sections.len(), 1);
    }

    #[test]
    fn test_format_conversation() {
        let mut interview = InterviewState::seeded(
            Editor {
                name: "Yuki".into(),
                affiliation: String::new(),
                role: String::new(),
                persona: "internals".into(),
            },
            "topic",
        );
        interview
            .messages
            .push(ChatMessage::assistant_named("Yuki", "What moves a value?"));

        let block = format_conversation(&interview);
        assert!(block.starts_with("Conversation with Yuki"));
        assert!(block.contains("Yuki: What moves a value?"));
    }
}
