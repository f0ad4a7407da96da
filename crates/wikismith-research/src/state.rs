//! Pipeline state and reducer
//!
//! Shared state evolves through one tagged update type: each stage takes
//! the state by reference and returns a [`StateUpdate`]; [`reduce`] is
//! the single place updates are merged. The outline is replaced
//! wholesale, never patched.

use crate::article::Article;
use crate::interview::EXPERT_NAME;
use crate::outline::{Editor, Outline, WikiSection};
use std::collections::BTreeMap;
use wikismith_foundation::llm::types::{ChatMessage, Role};

/// Per-persona interview transcript and citation map.
///
/// Owned exclusively by one interview run; never shared across personas.
#[derive(Debug, Clone)]
pub struct InterviewState {
    /// The editor persona conducting this interview
    pub editor: Editor,
    /// Role- and name-tagged transcript
    pub messages: Vec<ChatMessage>,
    /// Cited URL -> retrieved content, accumulated across turns
    pub references: BTreeMap<String, String>,
}

impl InterviewState {
    /// A fresh interview seeded with the expert's opening line.
    pub fn seeded(editor: Editor, topic: &str) -> Self {
        let opening = ChatMessage::assistant_named(
            EXPERT_NAME,
            format!("So you said you were writing an article on {topic}?"),
        );
        Self {
            editor,
            messages: vec![opening],
            references: BTreeMap::new(),
        }
    }

    /// Number of answers the expert has given so far.
    pub fn expert_answer_count(&self) -> usize {
        // The seed message is a greeting, not an answer.
        self.messages
            .iter()
            .skip(1)
            .filter(|m| m.role == Role::Assistant && m.is_from(EXPERT_NAME))
            .count()
    }

    /// The editor's most recent question, if any.
    pub fn last_question(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.is_from(EXPERT_NAME))
            .and_then(|m| m.text_content())
    }
}

/// Shared state for one research pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ResearchState {
    /// The topic being researched
    pub topic: String,
    /// Current outline (initial, then refined)
    pub outline: Option<Outline>,
    /// Selected editor personas
    pub editors: Vec<Editor>,
    /// Completed interviews
    pub interviews: Vec<InterviewState>,
    /// Number of reference documents indexed
    pub references_indexed: usize,
    /// Drafted sections
    pub sections: Vec<WikiSection>,
    /// Final article
    pub article: Option<Article>,
}

impl ResearchState {
    /// Fresh state for a topic.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Default::default()
        }
    }
}

/// The partial output of one pipeline stage.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    /// Outline drafted and editors selected
    ResearchInitialized {
        outline: Outline,
        editors: Vec<Editor>,
    },
    /// All surviving interviews finished
    InterviewsCompleted(Vec<InterviewState>),
    /// Outline replaced by the refined version
    OutlineRefined(Outline),
    /// Cited references persisted to the store
    ReferencesIndexed { indexed: usize },
    /// All sections drafted
    SectionsWritten(Vec<WikiSection>),
    /// Final article assembled
    ArticleAssembled(Article),
}

/// The single reducer merging a stage's update into the state.
pub fn reduce(state: &mut ResearchState, update: StateUpdate) {
    match update {
        StateUpdate::ResearchInitialized { outline, editors } => {
            state.outline = Some(outline);
            state.editors = editors;
        }
        StateUpdate::InterviewsCompleted(interviews) => {
            state.interviews = interviews;
        }
        StateUpdate::OutlineRefined(outline) => {
            state.outline = Some(outline);
        }
        StateUpdate::ReferencesIndexed { indexed } => {
            state.references_indexed = indexed;
        }
        StateUpdate::SectionsWritten(sections) => {
            state.sections = sections;
        }
        StateUpdate::ArticleAssembled(article) => {
            state.article = Some(article);
        }
    }
}
