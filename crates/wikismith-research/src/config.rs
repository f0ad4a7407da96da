//! Pipeline configuration
//!
//! Every tunable the stages consume, with the deployed defaults. Retry
//! budgets configure the shared retry executor per call site instead of
//! being hard-coded at each one.

use serde::{Deserialize, Serialize};
use wikismith_foundation::llm::types::RetryPolicy;

/// Research pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum question/answer turns per interview.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// How many persona interviews run concurrently.
    ///
    /// The default of 1 keeps the historical behavior of driving one
    /// interview at a time; raise it to fan interviews out.
    #[serde(default = "default_max_concurrent_interviews")]
    pub max_concurrent_interviews: usize,

    /// Results requested per search query.
    #[serde(default = "default_search_results_limit")]
    pub search_results_limit: usize,

    /// Character budget for the serialized search-result map handed to
    /// the answer call.
    #[serde(default = "default_max_search_chars")]
    pub max_search_chars: usize,

    /// Documents retrieved from the reference store per section.
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,

    /// Attempts for section-document retrieval before degrading to an
    /// empty context.
    #[serde(default = "default_retrieval_attempts")]
    pub retrieval_attempts: u32,

    /// Fixed wait between retrieval attempts, in milliseconds.
    #[serde(default = "default_retrieval_backoff_ms")]
    pub retrieval_backoff_ms: u64,

    /// Attempts for question-generation and other light model calls.
    #[serde(default = "default_question_attempts")]
    pub question_attempts: u32,

    /// Fixed wait between light model call attempts, in milliseconds.
    #[serde(default = "default_question_backoff_ms")]
    pub question_backoff_ms: u64,

    /// Attempts for query-generation and answer-synthesis calls.
    #[serde(default = "default_answer_attempts")]
    pub answer_attempts: u32,

    /// Fixed wait between answer-synthesis attempts, in milliseconds.
    #[serde(default = "default_answer_backoff_ms")]
    pub answer_backoff_ms: u64,

    /// Attempts for the structured section-writing call.
    #[serde(default = "default_section_attempts")]
    pub section_attempts: u32,

    /// Fixed wait between section-writing attempts, in milliseconds.
    #[serde(default = "default_section_backoff_ms")]
    pub section_backoff_ms: u64,
}

fn default_max_turns() -> u32 {
    3
}
fn default_max_concurrent_interviews() -> usize {
    1
}
fn default_search_results_limit() -> usize {
    3
}
fn default_max_search_chars() -> usize {
    15_000
}
fn default_retrieval_top_k() -> usize {
    10
}
fn default_retrieval_attempts() -> u32 {
    6
}
fn default_retrieval_backoff_ms() -> u64 {
    10_000
}
fn default_question_attempts() -> u32 {
    5
}
fn default_question_backoff_ms() -> u64 {
    3_000
}
fn default_answer_attempts() -> u32 {
    5
}
fn default_answer_backoff_ms() -> u64 {
    20_000
}
fn default_section_attempts() -> u32 {
    3
}
fn default_section_backoff_ms() -> u64 {
    3_000
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_concurrent_interviews: default_max_concurrent_interviews(),
            search_results_limit: default_search_results_limit(),
            max_search_chars: default_max_search_chars(),
            retrieval_top_k: default_retrieval_top_k(),
            retrieval_attempts: default_retrieval_attempts(),
            retrieval_backoff_ms: default_retrieval_backoff_ms(),
            question_attempts: default_question_attempts(),
            question_backoff_ms: default_question_backoff_ms(),
            answer_attempts: default_answer_attempts(),
            answer_backoff_ms: default_answer_backoff_ms(),
            section_attempts: default_section_attempts(),
            section_backoff_ms: default_section_backoff_ms(),
        }
    }
}

impl ResearchConfig {
    /// Config with every backoff zeroed and single-attempt budgets
    /// shrunk, for tests and offline smoke runs.
    pub fn fast() -> Self {
        Self {
            retrieval_backoff_ms: 0,
            question_backoff_ms: 0,
            answer_backoff_ms: 0,
            section_backoff_ms: 0,
            ..Default::default()
        }
    }

    /// Retry policy for question generation and other light calls.
    pub fn question_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.question_attempts, self.question_backoff_ms)
    }

    /// Retry policy for query generation and answer synthesis.
    pub fn answer_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.answer_attempts, self.answer_backoff_ms)
    }

    /// Retry policy for the structured section-writing call.
    pub fn section_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.section_attempts, self.section_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployed_budgets() {
        let config = ResearchConfig::default();
        assert_eq!(config.max_turns, 3);
        assert_eq!(config.max_concurrent_interviews, 1);
        assert_eq!(config.max_search_chars, 15_000);
        assert_eq!(config.retrieval_top_k, 10);
        assert_eq!(config.retrieval_attempts, 6);
        assert_eq!(config.retrieval_backoff_ms, 10_000);
        assert_eq!(config.answer_attempts, 5);
        assert_eq!(config.answer_backoff_ms, 20_000);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: ResearchConfig = serde_json::from_str(r#"{"max_turns": 2}"#).unwrap();
        assert_eq!(config.max_turns, 2);
        assert_eq!(config.retrieval_top_k, 10);
    }

    #[test]
    fn test_policies_carry_budgets() {
        let config = ResearchConfig::default();
        assert_eq!(config.answer_policy().max_attempts, 5);
        assert_eq!(
            config.answer_policy().backoff.delay(0).as_millis(),
            20_000
        );
        assert_eq!(config.section_policy().max_attempts, 3);
    }
}
