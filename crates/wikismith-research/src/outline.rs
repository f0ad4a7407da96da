//! Structured payloads exchanged with the model
//!
//! Every JSON shape the pipeline requests: the outline, the related
//! subjects survey, the editor perspectives, the search queries, the
//! cited answer, and the written section. Each type carries its format
//! instructions so call sites build prompts from one source of truth.

use serde::{Deserialize, Serialize};
use wikismith_kernel::StructuredPayload;

/// One outline section: a title plus ordered sub-section titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section title
    pub title: String,
    /// Ordered sub-section titles
    #[serde(default)]
    pub subsections: Vec<String>,
}

/// The article outline: an ordered sequence of sections.
///
/// Created once by the outline initializer, then replaced wholesale by
/// the refiner; consumers treat it as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Ordered sections
    pub sections: Vec<Section>,
}

impl Outline {
    /// Render the outline as markdown headings under the given topic.
    pub fn as_str(&self, topic: &str) -> String {
        let mut out = format!("# {topic}");
        for section in &self.sections {
            out.push_str(&format!("\n## {}", section.title));
            for subsection in &section.subsections {
                out.push_str(&format!("\n### {subsection}"));
            }
        }
        out
    }
}

impl StructuredPayload for Outline {
    fn shape_name() -> &'static str {
        "Outline"
    }

    fn format_instructions() -> &'static str {
        r#"{"sections": [{"title": <section title>, "subsections": [<subsection title>, ...]}, ...]}"#
    }
}

/// Subjects related to the topic, used to gather background documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSubjects {
    /// Comprehensive list of related subjects for background research
    pub topics: Vec<String>,
}

impl StructuredPayload for RelatedSubjects {
    fn shape_name() -> &'static str {
        "RelatedSubjects"
    }

    fn format_instructions() -> &'static str {
        r#"{"topics": [<related subject>, ...]}"#
    }
}

/// An editor persona that will interview the expert.
///
/// Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    /// Editor name
    pub name: String,
    /// Affiliation
    #[serde(default)]
    pub affiliation: String,
    /// Role description
    #[serde(default)]
    pub role: String,
    /// Focus text used to bias the questioning style
    pub persona: String,
}

impl Editor {
    /// Name restricted to the `[A-Za-z0-9_-]` alphabet chat APIs accept
    /// as a message-name tag.
    pub fn sanitized_name(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

/// The set of editors selected for a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perspectives {
    /// Selected editors
    pub editors: Vec<Editor>,
}

impl StructuredPayload for Perspectives {
    fn shape_name() -> &'static str {
        "Perspectives"
    }

    fn format_instructions() -> &'static str {
        r#"{"editors": [{"name": <name>, "affiliation": <affiliation>, "role": <role>, "persona": <what this editor will focus on>}, ...]}"#
    }
}

/// Search-engine queries generated to answer the editor's question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queries {
    /// Comprehensive list of search engine queries
    pub queries: Vec<String>,
}

impl StructuredPayload for Queries {
    fn shape_name() -> &'static str {
        "Queries"
    }

    fn format_instructions() -> &'static str {
        r#"{"queries": [<search engine query>, ...]}"#
    }
}

/// An expert answer with the URLs it cites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerWithCitations {
    /// Comprehensive answer to the editor's question, with citations
    pub answer: String,
    /// URLs cited in the answer
    #[serde(default)]
    pub cited_urls: Vec<String>,
}

impl AnswerWithCitations {
    /// Render the answer with a numbered citation block.
    pub fn as_str(&self) -> String {
        if self.cited_urls.is_empty() {
            return self.answer.clone();
        }
        let citations = self
            .cited_urls
            .iter()
            .enumerate()
            .map(|(i, url)| format!("[{}]: {url}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\nCitations:\n\n{citations}", self.answer)
    }
}

impl StructuredPayload for AnswerWithCitations {
    fn shape_name() -> &'static str {
        "AnswerWithCitations"
    }

    fn format_instructions() -> &'static str {
        r#"{"answer": <comprehensive answer with footnote citations>, "cited_urls": [<cited url>, ...]}"#
    }
}

/// A drafted article section with its source URLs.
///
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiSection {
    /// Section title
    pub title: String,
    /// Section body text
    pub content: String,
    /// Source URLs cited by this section
    #[serde(default)]
    pub sources: Vec<String>,
}

impl WikiSection {
    /// Render as a markdown section.
    pub fn as_str(&self) -> String {
        format!("## {}\n\n{}", self.title, self.content)
    }
}

impl StructuredPayload for WikiSection {
    fn shape_name() -> &'static str {
        "WikiSection"
    }

    fn format_instructions() -> &'static str {
        r#"{"title": <section title>, "content": <full section text in markdown>, "sources": [<cited url>, ...]}"#
    }
}
