//! Retry mechanism for LLM calls
//!
//! Every model call in the pipelines goes through [`RetryExecutor`]: one
//! reusable combinator configured per call site with a [`RetryPolicy`]
//! (max attempts, backoff schedule, retryable-error predicate), replacing
//! hand-copied sleep loops at each call site.
//!
//! Beyond transport failures, the executor validates two response-level
//! contracts inside the loop so violations use the same retry budget:
//! structured output (repair + parse + shape check) and tool-call names
//! (a call to a tool that was never offered is an error, not a result).

use super::structured;
use super::types::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wikismith_kernel::StructuredPayload;

use super::provider::LLMProvider;

/// Retry executor for LLM calls.
pub struct RetryExecutor {
    provider: Arc<dyn LLMProvider>,
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor.
    pub fn new(provider: Arc<dyn LLMProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// The configured policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a chat completion request with retry logic.
    pub async fn chat(
        &self,
        mut request: ChatCompletionRequest,
    ) -> LLMResult<ChatCompletionResponse> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<LLMError> = None;

        for attempt in 0..max_attempts {
            self.wait_before(attempt, max_attempts).await;

            match self.provider.chat(request.clone()).await {
                Ok(response) => {
                    if let Err(error) = self.validate_response(&request, &response) {
                        if attempt < max_attempts - 1 && self.policy.should_retry_error(&error) {
                            warn!(attempt = attempt + 1, %error, "response validation failed");
                            request = self.prepare_retry_request(request, &error);
                            last_error = Some(error);
                            continue;
                        }
                        return Err(error);
                    }
                    if attempt > 0 {
                        info!("request succeeded on attempt {}", attempt + 1);
                    }
                    return Ok(response);
                }
                Err(error) => {
                    if attempt < max_attempts - 1 && self.policy.should_retry_error(&error) {
                        warn!(attempt = attempt + 1, %error, "request failed, retrying");
                        request = self.prepare_retry_request(request, &error);
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LLMError::Other("retry loop produced no result".into())))
    }

    /// Execute a chat request whose answer must decode into `T`.
    ///
    /// The decode runs inside the retry loop: a malformed or wrong-shape
    /// response consumes an attempt and, under `PromptRetry`, feeds the
    /// decode error back to the model.
    pub async fn chat_structured<T>(
        &self,
        request: ChatCompletionRequest,
    ) -> LLMResult<(T, ChatCompletionResponse)>
    where
        T: DeserializeOwned + StructuredPayload,
    {
        let mut request = request.json_object();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error: Option<LLMError> = None;

        for attempt in 0..max_attempts {
            self.wait_before(attempt, max_attempts).await;

            let outcome: Result<(), LLMError> = match self.provider.chat(request.clone()).await {
                Ok(response) => {
                    let content = response.content().unwrap_or_default();
                    match structured::decode::<T>(content) {
                        Ok(decoded) => return Ok((decoded, response)),
                        Err(decode_err) => Err(LLMError::from(decode_err)),
                    }
                }
                Err(error) => Err(error),
            };

            let error = outcome.unwrap_err();
            if attempt < max_attempts - 1 && self.policy.should_retry_error(&error) {
                warn!(
                    attempt = attempt + 1,
                    shape = T::shape_name(),
                    %error,
                    "structured call failed, retrying"
                );
                request = self.prepare_retry_request(request, &error);
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| LLMError::Other("retry loop produced no result".into())))
    }

    async fn wait_before(&self, attempt: u32, max_attempts: u32) {
        if attempt > 0 {
            let delay = self.policy.backoff.delay(attempt - 1);
            debug!(
                "retry attempt {}/{} after {}ms",
                attempt + 1,
                max_attempts,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Response-level contract checks: JSON mode and tool-call names.
    fn validate_response(
        &self,
        request: &ChatCompletionRequest,
        response: &ChatCompletionResponse,
    ) -> LLMResult<()> {
        if request.is_json_mode() {
            let content = response.content().unwrap_or_default();
            let repaired = structured::repair_json(content);
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&repaired) {
                return Err(LLMError::SerializationError(format!(
                    "response is not valid JSON: {e}"
                )));
            }
        }

        if let Some(tools) = request.tools.as_deref() {
            let offered: Vec<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();
            for call in response.tool_calls() {
                if !offered.contains(&call.function.name.as_str()) {
                    return Err(LLMError::InvalidToolCall(format!(
                        "model called '{}', offered tools: {}",
                        call.function.name,
                        offered.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }

    /// Prepare the request for the next attempt based on the error strategy.
    fn prepare_retry_request(
        &self,
        mut request: ChatCompletionRequest,
        error: &LLMError,
    ) -> ChatCompletionRequest {
        match self.policy.strategy_for_error(error) {
            RetryStrategy::NoRetry | RetryStrategy::DirectRetry => request,
            RetryStrategy::PromptRetry => {
                let note = format!(
                    "\n\n[RETRY CONTEXT: the previous attempt failed: {error}. \
                     Respond again, fixing the problem. The response must follow \
                     the requested format exactly.]"
                );
                if let Some(msg) = request.messages.iter_mut().find(|m| m.role == Role::System) {
                    let existing = msg.text_content().unwrap_or("").to_string();
                    msg.content = Some(format!("{existing}{note}"));
                } else {
                    request.messages.insert(0, ChatMessage::system(note));
                }
                request
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::ScriptedProvider;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        ok: bool,
    }

    impl StructuredPayload for Verdict {
        fn shape_name() -> &'static str {
            "Verdict"
        }

        fn format_instructions() -> &'static str {
            r#"{"ok": <bool>}"#
        }
    }

    fn response(content: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            model: "scripted".to_string(),
            message: ChatMessage::assistant(content),
            usage: None,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::fixed(max_attempts, 0)
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(LLMError::NetworkError("temporary failure".into())),
            Ok(response("fine now")),
        ]));

        let executor = RetryExecutor::new(provider.clone(), fast_policy(3));
        let request = ChatCompletionRequest::new().user("hello");

        let result = executor.chat(request).await.unwrap();
        assert_eq!(result.content(), Some("fine now"));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_json_mode_validation_retries() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(response("not valid JSON")),
            Ok(response(r#"{"valid": true}"#)),
        ]));

        let executor = RetryExecutor::new(provider, fast_policy(3));
        let request = ChatCompletionRequest::new().user("give me JSON").json_object();

        let result = executor.chat(request).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_structured_decode_retries_and_amends_prompt() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(response(r#"{"wrong_field": 1}"#)),
            Ok(response(r#"{"ok": true}"#)),
        ]));

        let executor = RetryExecutor::new(provider.clone(), fast_policy(3));
        let request = ChatCompletionRequest::new()
            .system("Respond in JSON.")
            .user("judge");

        let (verdict, _) = executor.chat_structured::<Verdict>(request).await.unwrap();
        assert!(verdict.ok);

        // Second attempt carried the decode error back to the model.
        let second = provider.request_at(1).unwrap();
        let system = second.messages[0].text_content().unwrap().to_string();
        assert!(system.contains("RETRY CONTEXT"));
        assert!(system.contains("Verdict"));
    }

    #[tokio::test]
    async fn test_tool_call_name_validation() {
        let bad_call = ToolCall {
            id: "call-1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "made_up_tool".into(),
                arguments: "{}".into(),
            },
        };
        let mut bad = response("");
        bad.message = ChatMessage::assistant_with_tool_calls(vec![bad_call]);

        let good_call = ToolCall {
            id: "call-2".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "search_engine".into(),
                arguments: r#"{"query": "rust"}"#.into(),
            },
        };
        let mut good = response("");
        good.message = ChatMessage::assistant_with_tool_calls(vec![good_call]);

        let provider = Arc::new(ScriptedProvider::new(vec![Ok(bad), Ok(good)]));
        let executor = RetryExecutor::new(provider, fast_policy(3));

        let tool = Tool::function(
            "search_engine",
            "Search the web",
            serde_json::json!({"type": "object"}),
        );
        let request = ChatCompletionRequest::new().user("search").tools(vec![tool]);

        let result = executor.chat(request).await.unwrap();
        assert_eq!(result.tool_calls()[0].function.name, "search_engine");
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_last_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Err(LLMError::NetworkError("one".into())),
            Err(LLMError::NetworkError("two".into())),
            Err(LLMError::NetworkError("three".into())),
        ]));

        let executor = RetryExecutor::new(provider, fast_policy(3));
        let err = executor
            .chat(ChatCompletionRequest::new().user("hi"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("three"));
    }

    #[tokio::test]
    async fn test_no_retry_policy_fails_fast() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(LLMError::NetworkError(
            "down".into(),
        ))]));

        let executor = RetryExecutor::new(provider.clone(), RetryPolicy::no_retry());
        let result = executor.chat(ChatCompletionRequest::new().user("hi")).await;
        assert!(result.is_err());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(LLMError::QuotaExceeded(
            "billing".into(),
        ))]));

        let executor = RetryExecutor::new(provider.clone(), fast_policy(5));
        let result = executor.chat(ChatCompletionRequest::new().user("hi")).await;
        assert!(matches!(result, Err(LLMError::QuotaExceeded(_))));
        assert_eq!(provider.calls(), 1);
    }
}
