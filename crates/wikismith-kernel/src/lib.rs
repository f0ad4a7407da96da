//! Wikismith Kernel
//!
//! Core contracts shared by every layer of the research/writing pipelines:
//! the global error type, configuration loading, the structured-output
//! contract for model-produced JSON, and the traits behind the reference
//! store and the web search backends.
//!
//! Concrete implementations live in `wikismith-foundation`; the pipeline
//! stages themselves live in `wikismith-research`.

pub mod config;
pub mod error;
pub mod search;
pub mod store;
pub mod structured;

pub use error::{PipelineError, PipelineResult};
pub use search::{SearchHit, SearchProvider};
pub use store::{
    Document, Embedder, ReferenceStore, ScoredDocument, SimilarityMetric, VectorStore,
};
pub use structured::StructuredPayload;
