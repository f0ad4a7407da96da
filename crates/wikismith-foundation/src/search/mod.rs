//! Web search backends
//!
//! Implementations of the kernel `SearchProvider` trait: a SearxNG HTTP
//! backend, a static fixture backend for offline runs and tests, and a
//! router that dispatches on a named backend selector.

pub mod router;
pub mod searx;
pub mod fixture;

pub use fixture::StaticSearchProvider;
pub use router::SearchRouter;
pub use searx::{SearxConfig, SearxProvider};
