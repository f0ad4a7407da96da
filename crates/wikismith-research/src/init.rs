//! Outline initializer
//!
//! Fans out two independent calls for a topic: the outline draft and the
//! related-subjects survey. The survey's topics feed background document
//! retrieval, whose digests feed the editor-selection call. JSON parse
//! failure after repair fails the whole stage; there is no partial
//! outline.

use crate::background::TopicDocRetriever;
use crate::context::ResearchContext;
use crate::outline::{Editor, Outline, Perspectives, RelatedSubjects};
use crate::prompts;
use tracing::info;
use wikismith_foundation::llm::types::ChatCompletionRequest;
use wikismith_kernel::{PipelineError, PipelineResult, StructuredPayload};

/// Drafts the initial outline and selects the editor personas.
pub struct OutlineInitializer<'a> {
    ctx: &'a ResearchContext,
}

impl<'a> OutlineInitializer<'a> {
    /// Create an initializer over the given context.
    pub fn new(ctx: &'a ResearchContext) -> Self {
        Self { ctx }
    }

    /// Produce `(Outline, editors)` for the topic.
    pub async fn run(&self, topic: &str) -> PipelineResult<(Outline, Vec<Editor>)> {
        let (outline, perspectives) =
            tokio::join!(self.draft_outline(topic), self.survey_subjects(topic));
        let outline = outline?;
        let perspectives = perspectives?;

        if outline.sections.is_empty() {
            return Err(PipelineError::invalid_output(
                "initial outline has no sections",
            ));
        }
        if perspectives.editors.is_empty() {
            return Err(PipelineError::invalid_output("no editors selected"));
        }

        info!(
            sections = outline.sections.len(),
            editors = perspectives.editors.len(),
            "research initialized"
        );
        Ok((outline, perspectives.editors))
    }

    async fn draft_outline(&self, topic: &str) -> PipelineResult<Outline> {
        let request = ChatCompletionRequest::new()
            .system(prompts::outline_system(Outline::format_instructions()))
            .user(topic);

        let (outline, _) = self
            .ctx
            .executor(self.ctx.config.question_policy())
            .chat_structured::<Outline>(request)
            .await?;
        Ok(outline)
    }

    async fn survey_subjects(&self, topic: &str) -> PipelineResult<Perspectives> {
        let request = ChatCompletionRequest::new().user(prompts::related_subjects_prompt(
            topic,
            RelatedSubjects::format_instructions(),
        ));
        let (related, _) = self
            .ctx
            .executor(self.ctx.config.question_policy())
            .chat_structured::<RelatedSubjects>(request)
            .await?;

        let examples = TopicDocRetriever::new(self.ctx.search.clone())
            .retrieve(&related.topics)
            .await?;

        let request = ChatCompletionRequest::new()
            .system(prompts::perspectives_system(
                &examples,
                Perspectives::format_instructions(),
            ))
            .user(format!("Topic of interest: {topic}"));
        let (perspectives, _) = self
            .ctx
            .executor(self.ctx.config.question_policy())
            .chat_structured::<Perspectives>(request)
            .await?;
        Ok(perspectives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use std::sync::Arc;
    use wikismith_foundation::llm::mock::ScriptedProvider;
    use wikismith_foundation::llm::types::{ChatCompletionResponse, ChatMessage, LLMResult};
    use wikismith_foundation::search::StaticSearchProvider;
    use wikismith_foundation::store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore};
    use wikismith_kernel::SearchHit;

    fn assistant(content: &str) -> LLMResult<ChatCompletionResponse> {
        Ok(ChatCompletionResponse {
            model: "scripted".to_string(),
            message: ChatMessage::assistant(content),
            usage: None,
        })
    }

    fn ctx(script: Vec<LLMResult<ChatCompletionResponse>>) -> ResearchContext {
        let search = Arc::new(StaticSearchProvider::new().with_fallback(vec![SearchHit::new(
            "Background",
            "https://bg.example",
            "context",
        )]));
        let store = Arc::new(VectorReferenceStore::new(
            Arc::new(HashEmbedder::default()),
            InMemoryVectorStore::cosine(),
        ));
        ResearchContext::new(Arc::new(ScriptedProvider::new(script)), search, store)
            .with_config(ResearchConfig::fast())
    }

    // The two initializer sub-calls run concurrently, so the scripted
    // provider serves whichever fires first. Responses that satisfy both
    // shapes in either order are not possible here, so the script lists
    // the outline first and relies on join! polling order.
    #[tokio::test]
    async fn test_initializer_returns_outline_and_editors() {
        let script = vec![
            assistant(r#"{"sections": [{"title": "Background", "subsections": ["History"]}]}"#),
            assistant(r#"{"topics": ["Borrowing", "Lifetimes"]}"#),
            assistant(
                r#"{"editors": [{"name": "yuki", "affiliation": "compiler", "role": "engineer", "persona": "internals"}]}"#,
            ),
        ];
        let context = ctx(script);

        let (outline, editors) = OutlineInitializer::new(&context)
            .run("Rust ownership model")
            .await
            .unwrap();

        assert_eq!(outline.sections.len(), 1);
        assert_eq!(editors.len(), 1);
        assert_eq!(editors[0].name, "yuki");
    }

    #[tokio::test]
    async fn test_empty_editor_list_is_error() {
        let script = vec![
            assistant(r#"{"sections": [{"title": "Background"}]}"#),
            assistant(r#"{"topics": []}"#),
            assistant(r#"{"editors": []}"#),
        ];
        let context = ctx(script);

        let err = OutlineInitializer::new(&context)
            .run("Rust ownership model")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_unparseable_outline_fails_stage() {
        let context = ctx(vec![
            assistant("I would rather chat about the weather."),
            assistant(r#"{"topics": []}"#),
            assistant(r#"{"editors": []}"#),
            // Retries for the outline shape drain the script.
            assistant("still not JSON"),
            assistant("nope"),
            assistant("no"),
            assistant("n"),
        ]);

        let result = OutlineInitializer::new(&context)
            .run("Rust ownership model")
            .await;
        assert!(result.is_err());
    }
}
