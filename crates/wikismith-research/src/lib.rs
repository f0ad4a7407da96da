//! Wikismith Research
//!
//! The multi-round research/interview pipeline: given a topic, draft an
//! outline and a set of editor personas, interview a subject-matter
//! expert from each persona's perspective with search-engine grounding,
//! refine the outline from the transcripts, index every cited reference,
//! write each section against the indexed references, and assemble the
//! final article.
//!
//! Stage order (each stage is state-in, update-out; one reducer merges):
//!
//! ```text
//! initialize_research ─▶ conduct_interviews ─▶ refine_outline
//!        ─▶ index_references ─▶ write_sections ─▶ write_article
//! ```
//!
//! All external services (model, search, reference store) reach the
//! stages through an explicitly injected [`context::ResearchContext`].

pub mod article;
pub mod background;
pub mod config;
pub mod context;
pub mod index;
pub mod init;
pub mod interview;
pub mod outline;
pub mod pipeline;
pub mod prompts;
pub mod refine;
pub mod sections;
pub mod state;
pub mod transcript;

pub use article::Article;
pub use config::ResearchConfig;
pub use context::ResearchContext;
pub use interview::{CLOSING_PHRASE, EXPERT_NAME, InterviewRunner};
pub use outline::{
    AnswerWithCitations, Editor, Outline, Perspectives, Queries, RelatedSubjects, Section,
    WikiSection,
};
pub use pipeline::ResearchPipeline;
pub use state::{InterviewState, ResearchState, StateUpdate, reduce};
