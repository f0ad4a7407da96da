//! Interview runner
//!
//! The bounded multi-turn loop at the heart of the pipeline. Per turn:
//! the editor persona asks a question, the expert viewpoint generates
//! search queries, all queries run concurrently against the search
//! backend (individual failures dropped), and an answer with citations
//! is synthesized from the merged results. Only URLs the answer actually
//! cites enter the interview's reference map.

use crate::context::ResearchContext;
use crate::outline::{AnswerWithCitations, Editor, Queries};
use crate::prompts;
use crate::state::InterviewState;
use crate::transcript::swap_roles;
use futures::future::join_all;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wikismith_foundation::llm::types::{
    ChatCompletionRequest, ChatMessage, FunctionCall, ToolCall,
};
use wikismith_kernel::{PipelineError, PipelineResult, StructuredPayload};

/// Name tag for the simulated subject-matter expert.
pub const EXPERT_NAME: &str = "Subject_Matter_Expert";

/// Exact suffix the persona emits to end its interview early.
pub const CLOSING_PHRASE: &str = "Thank you so much for your help!";

/// Runs one persona's interview to completion.
pub struct InterviewRunner<'a> {
    ctx: &'a ResearchContext,
}

impl<'a> InterviewRunner<'a> {
    /// Create a runner over the given context.
    pub fn new(ctx: &'a ResearchContext) -> Self {
        Self { ctx }
    }

    /// Run the interview for `editor` about `topic`.
    ///
    /// Terminates after `max_turns` expert answers, or earlier when the
    /// persona's last question ends with [`CLOSING_PHRASE`].
    pub async fn run(&self, topic: &str, editor: &Editor) -> PipelineResult<InterviewState> {
        let mut state = InterviewState::seeded(editor.clone(), topic);
        let max_turns = self.ctx.config.max_turns as usize;

        info!(editor = %editor.name, %topic, "starting interview");

        while state.expert_answer_count() < max_turns {
            self.ask_question(&mut state).await?;

            if state
                .last_question()
                .is_some_and(|q| q.trim_end().ends_with(CLOSING_PHRASE))
            {
                debug!(editor = %editor.name, "editor closed the interview");
                break;
            }

            self.answer_question(&mut state).await?;
        }

        info!(
            editor = %editor.name,
            turns = state.expert_answer_count(),
            references = state.references.len(),
            "interview finished"
        );
        Ok(state)
    }

    /// Generate the persona's next question and append it.
    async fn ask_question(&self, state: &mut InterviewState) -> PipelineResult<()> {
        let name = state.editor.sanitized_name();
        let view = swap_roles(&state.messages, &name);

        let request = ChatCompletionRequest::new()
            .system(prompts::question_system(&state.editor.persona))
            .extend(view);

        let response = self
            .ctx
            .executor(self.ctx.config.question_policy())
            .chat(request)
            .await?;

        let question = response
            .content()
            .map(str::to_string)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| PipelineError::stage("gen_question", "model returned no question"))?;

        state.messages.push(ChatMessage::assistant_named(name, question));
        Ok(())
    }

    /// Produce the expert's cited answer for the latest question.
    async fn answer_question(&self, state: &mut InterviewState) -> PipelineResult<()> {
        let view = swap_roles(&state.messages, EXPERT_NAME);

        // Search queries, from the expert's viewpoint.
        let queries_request = ChatCompletionRequest::new()
            .system(prompts::queries_system(Queries::format_instructions()))
            .extend(view.clone());
        let (queries, _) = self
            .ctx
            .executor(self.ctx.config.answer_policy())
            .chat_structured::<Queries>(queries_request)
            .await?;

        if queries.queries.is_empty() {
            return Err(PipelineError::stage(
                "gen_answer",
                "no search queries generated",
            ));
        }

        let results = self.run_query_batch(&queries.queries).await;

        // Bound the serialized result map handed to the model.
        let mut dumped = serde_json::to_string(&results)?;
        truncate_to_boundary(&mut dumped, self.ctx.config.max_search_chars);

        // Record the query round in the working conversation as a tool
        // exchange, keeping the shared transcript free of intermediates.
        let call_id = Uuid::new_v4().to_string();
        let tool_call = ToolCall {
            id: call_id.clone(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "search_engine".to_string(),
                arguments: serde_json::to_string(&queries)?,
            },
        };
        let mut convo = view;
        convo.push(ChatMessage::assistant_with_tool_calls(vec![tool_call]));
        convo.push(ChatMessage::tool_result(call_id, dumped));

        let answer_request = ChatCompletionRequest::new()
            .system(prompts::answer_system(
                AnswerWithCitations::format_instructions(),
            ))
            .extend(convo);
        let (answer, _) = self
            .ctx
            .executor(self.ctx.config.answer_policy())
            .chat_structured::<AnswerWithCitations>(answer_request)
            .await?;

        // Only citations present in this turn's result map are kept.
        let cited: BTreeMap<String, String> = answer
            .cited_urls
            .iter()
            .filter_map(|url| results.get(url).map(|content| (url.clone(), content.clone())))
            .collect();
        if cited.is_empty() {
            warn!(editor = %state.editor.name, "answer cited no tracked urls");
        }
        state.references.extend(cited);

        state
            .messages
            .push(ChatMessage::assistant_named(EXPERT_NAME, answer.as_str()));
        Ok(())
    }

    /// Run all queries concurrently; failed queries are dropped and the
    /// successful results merged into one url -> content map.
    async fn run_query_batch(&self, queries: &[String]) -> BTreeMap<String, String> {
        let limit = self.ctx.config.search_results_limit;
        let outcomes = join_all(
            queries
                .iter()
                .map(|query| self.ctx.search.search(query, limit)),
        )
        .await;

        let mut merged = BTreeMap::new();
        for (query, outcome) in queries.iter().zip(outcomes) {
            match outcome {
                Ok(hits) => {
                    for hit in hits {
                        merged.insert(hit.url, hit.content);
                    }
                }
                Err(error) => {
                    warn!(%query, %error, "search query failed, dropping");
                }
            }
        }
        merged
    }
}

/// Truncate in place to at most `max` bytes, on a char boundary.
fn truncate_to_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResearchConfig;
    use async_trait::async_trait;
    use std::sync::Arc;
    use wikismith_foundation::llm::mock::ScriptedProvider;
    use wikismith_foundation::llm::types::{ChatCompletionResponse, LLMResult};
    use wikismith_foundation::search::StaticSearchProvider;
    use wikismith_foundation::store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore};
    use wikismith_kernel::{SearchHit, SearchProvider};

    fn editor() -> Editor {
        Editor {
            name: "Yuki Tanaka".to_string(),
            affiliation: "Compiler team".to_string(),
            role: "engineer".to_string(),
            persona: "compiler internals".to_string(),
        }
    }

    fn assistant(content: &str) -> LLMResult<ChatCompletionResponse> {
        Ok(ChatCompletionResponse {
            model: "scripted".to_string(),
            message: ChatMessage::assistant(content),
            usage: None,
        })
    }

    fn queries_json() -> LLMResult<ChatCompletionResponse> {
        assistant(r#"{"queries": ["rust ownership"]}"#)
    }

    fn answer_json(cited: &[&str]) -> LLMResult<ChatCompletionResponse> {
        let urls: Vec<String> = cited.iter().map(|u| format!("\"{u}\"")).collect();
        assistant(&format!(
            r#"{{"answer": "Ownership moves values.", "cited_urls": [{}]}}"#,
            urls.join(", ")
        ))
    }

    fn ctx(
        script: Vec<LLMResult<ChatCompletionResponse>>,
        search: Arc<dyn SearchProvider>,
        max_turns: u32,
    ) -> ResearchContext {
        let store = Arc::new(VectorReferenceStore::new(
            Arc::new(HashEmbedder::default()),
            InMemoryVectorStore::cosine(),
        ));
        ResearchContext::new(Arc::new(ScriptedProvider::new(script)), search, store).with_config(
            ResearchConfig {
                max_turns,
                ..ResearchConfig::fast()
            },
        )
    }

    fn search_with_book() -> Arc<dyn SearchProvider> {
        Arc::new(StaticSearchProvider::new().with_fallback(vec![
            SearchHit::new("Rust Book", "https://book.example/ch04", "Ownership moves."),
            SearchHit::new("Reference", "https://ref.example", "Move semantics."),
        ]))
    }

    #[tokio::test]
    async fn test_interview_terminates_at_max_turns_without_sentinel() {
        // The editor never says the closing phrase; the loop must stop at
        // max_turns expert answers anyway.
        let script = vec![
            assistant("What is ownership?"),
            queries_json(),
            answer_json(&["https://book.example/ch04"]),
            assistant("And borrowing?"),
            queries_json(),
            answer_json(&["https://ref.example"]),
            // Extra entries that must never be consumed.
            assistant("Third question?"),
            queries_json(),
            answer_json(&[]),
        ];
        let context = ctx(script, search_with_book(), 2);

        let state = InterviewRunner::new(&context)
            .run("Rust ownership model", &editor())
            .await
            .unwrap();

        assert_eq!(state.expert_answer_count(), 2);
        assert_eq!(state.references.len(), 2);
    }

    #[tokio::test]
    async fn test_interview_stops_on_closing_phrase() {
        let script = vec![
            assistant("What is ownership?"),
            queries_json(),
            answer_json(&["https://book.example/ch04"]),
            assistant("Great. Thank you so much for your help!"),
            // No further answer turn may run.
        ];
        let context = ctx(script, search_with_book(), 5);

        let state = InterviewRunner::new(&context)
            .run("Rust ownership model", &editor())
            .await
            .unwrap();

        assert_eq!(state.expert_answer_count(), 1);
        let last = state.last_question().unwrap();
        assert!(last.ends_with(CLOSING_PHRASE));
    }

    #[tokio::test]
    async fn test_citations_are_subset_of_search_results() {
        // The answer cites one tracked URL and one the search never
        // returned; only the tracked one may be stored.
        let script = vec![
            assistant("What is ownership?"),
            queries_json(),
            answer_json(&["https://book.example/ch04", "https://made-up.example"]),
        ];
        let context = ctx(script, search_with_book(), 1);

        let state = InterviewRunner::new(&context)
            .run("Rust ownership model", &editor())
            .await
            .unwrap();

        assert_eq!(state.references.len(), 1);
        assert!(state.references.contains_key("https://book.example/ch04"));
        assert!(!state.references.contains_key("https://made-up.example"));
    }

    struct FlakySearch;

    #[async_trait]
    impl SearchProvider for FlakySearch {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn search(&self, query: &str, _limit: usize) -> PipelineResult<Vec<SearchHit>> {
            if query.contains("fail") {
                Err(PipelineError::search("backend exploded"))
            } else {
                Ok(vec![SearchHit::new(
                    "ok",
                    format!("https://ok.example/{}", query.replace(' ', "-")),
                    "content",
                )])
            }
        }
    }

    #[tokio::test]
    async fn test_query_batch_tolerates_partial_failure() {
        let context = ctx(vec![], Arc::new(FlakySearch), 1);
        let runner = InterviewRunner::new(&context);

        let merged = runner
            .run_query_batch(&[
                "first query".to_string(),
                "fail me".to_string(),
                "third query".to_string(),
            ])
            .await;

        // 3 queries, 1 failed: exactly 2 merged entries, no error.
        assert_eq!(merged.len(), 2);
        assert!(merged.contains_key("https://ok.example/first-query"));
        assert!(merged.contains_key("https://ok.example/third-query"));
    }

    #[tokio::test]
    async fn test_empty_query_list_is_stage_failure() {
        let script = vec![
            assistant("What is ownership?"),
            assistant(r#"{"queries": []}"#),
        ];
        let context = ctx(script, search_with_book(), 1);

        let err = InterviewRunner::new(&context)
            .run("Rust ownership model", &editor())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::StageFailed { .. }));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let mut text = "héllo wörld".to_string();
        truncate_to_boundary(&mut text, 2);
        assert_eq!(text, "h");

        let mut short = "ok".to_string();
        truncate_to_boundary(&mut short, 100);
        assert_eq!(short, "ok");
    }
}
