//! Wikismith Foundation
//!
//! Concrete building blocks under the kernel contracts:
//!
//! - [`llm`] — chat message types, the provider trait, the retry
//!   executor, the structured-output decode boundary and the
//!   OpenAI-compatible provider.
//! - [`store`] — in-memory vector store, similarity functions, embedders
//!   and the document-level reference store.
//! - [`search`] — web search backends (SearxNG) and the backend router.

pub mod llm;
pub mod search;
pub mod store;

pub use llm::{
    BackoffStrategy, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, DecodeError,
    LLMConfig, LLMError, LLMProvider, LLMResult, RetryExecutor, RetryPolicy, Role,
};
pub use search::{SearchRouter, SearxConfig, SearxProvider, StaticSearchProvider};
pub use store::{HashEmbedder, InMemoryVectorStore, VectorReferenceStore, compute_similarity};
