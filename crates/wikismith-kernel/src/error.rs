//! Global Error Type System
//!
//! One error hierarchy integrating the layers a pipeline run crosses:
//! model calls, web search, the reference store, structured-output
//! decoding, and configuration.
//!
//! # Design Goals
//!
//! - Single error abstraction at the pipeline boundary
//! - Preserve which layer a failure came from
//! - Enable cross-crate error conversion via `From` impls so `?` works
//!   across crate boundaries

use std::fmt;

/// Global pipeline error type.
///
/// Downstream crates implement `From<TheirError> for PipelineError` to
/// enable seamless `?` operator usage across crate boundaries.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    // ---- Layer errors ----

    /// Model-invocation layer error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search backend error
    #[error("Search error: {0}")]
    Search(String),

    /// Reference / vector store error
    #[error("Store error: {0}")]
    Store(String),

    /// Structured-output decoding error (repair + parse + shape check)
    #[error("Decode error: {0}")]
    Decode(String),

    // ---- Infrastructure errors ----

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization / deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    // ---- Pipeline errors ----

    /// Invalid input handed to a stage
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stage produced output that violates its contract
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// A named stage failed after exhausting its local recovery budget
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    // ---- Catch-all ----

    /// Other / untyped error
    #[error("Pipeline error: {0}")]
    Other(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create an LLM-layer error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a search-layer error
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a store-layer error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid-output error
    pub fn invalid_output(msg: impl Into<String>) -> Self {
        Self::InvalidOutput(msg.into())
    }

    /// Create a stage-failure error
    pub fn stage(stage: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error originated in an external service layer
    /// (model, search, store) as opposed to this process's own logic.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Llm(_) | Self::Search(_) | Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_preserve_layer() {
        assert!(matches!(PipelineError::llm("x"), PipelineError::Llm(_)));
        assert!(matches!(
            PipelineError::search("x"),
            PipelineError::Search(_)
        ));
        assert!(matches!(PipelineError::store("x"), PipelineError::Store(_)));
        assert!(matches!(
            PipelineError::decode("x"),
            PipelineError::Decode(_)
        ));
    }

    #[test]
    fn test_stage_error_display() {
        let err = PipelineError::stage("conduct_interviews", "no queries generated");
        assert_eq!(
            err.to_string(),
            "Stage 'conduct_interviews' failed: no queries generated"
        );
    }

    #[test]
    fn test_is_external() {
        assert!(PipelineError::llm("x").is_external());
        assert!(PipelineError::search("x").is_external());
        assert!(!PipelineError::invalid_input("x").is_external());
        assert!(!PipelineError::decode("x").is_external());
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: PipelineError = parse_err.into();
        assert!(matches!(err, PipelineError::Serialization(_)));
    }
}
