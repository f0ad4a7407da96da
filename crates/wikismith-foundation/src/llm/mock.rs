//! Scripted provider for tests and offline runs
//!
//! Plays back a fixed sequence of responses and records every request it
//! receives, so tests can assert on prompt construction without a live
//! endpoint.

use super::provider::LLMProvider;
use super::types::*;
use async_trait::async_trait;
use std::sync::Mutex;

/// A provider that returns pre-scripted results in order.
///
/// Once the script is exhausted every further call fails, which makes
/// over-calling visible in tests.
pub struct ScriptedProvider {
    script: Mutex<std::vec::IntoIter<LLMResult<ChatCompletionResponse>>>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl ScriptedProvider {
    /// Create a provider that plays back `script` in order.
    pub fn new(script: Vec<LLMResult<ChatCompletionResponse>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: a provider answering every call with the same text.
    pub fn always(content: impl Into<String>) -> Self {
        let content = content.into();
        let response = ChatCompletionResponse {
            model: "scripted".to_string(),
            message: ChatMessage::assistant(content),
            usage: None,
        };
        // A long enough script for any reasonable test.
        Self::new(std::iter::repeat_with(|| Ok(response.clone())).take(256).collect())
    }

    /// Number of chat calls received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The `index`-th request received, if any.
    pub fn request_at(&self, index: usize) -> Option<ChatCompletionRequest> {
        self.requests.lock().unwrap().get(index).cloned()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatCompletionRequest) -> LLMResult<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| Err(LLMError::Other("script exhausted".to_string())))
    }
}
