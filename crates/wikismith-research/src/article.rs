//! Article assembler
//!
//! Deterministic final stage: concatenates the drafted sections under
//! the topic in outline order and appends one references block built by
//! deduplicating cited URLs across sections (first-seen order). No model
//! call.

use crate::outline::{Outline, WikiSection};

/// The final assembled article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// The researched topic
    pub topic: String,
    /// Full markdown text, including the references block
    pub content: String,
    /// Deduplicated cited URLs, in first-seen order
    pub footnotes: Vec<String>,
}

/// Assemble the final article from the drafted sections.
///
/// Sections are emitted in outline order; drafted sections whose title
/// matches no outline entry are appended at the end in draft order.
pub fn assemble(topic: &str, outline: &Outline, sections: &[WikiSection]) -> Article {
    let ordered = order_sections(outline, sections);

    let body = ordered
        .iter()
        .map(|section| section.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let footnotes = dedup_footnotes(&ordered);

    let mut content = format!("# {topic}\n\n{body}");
    if !footnotes.is_empty() {
        let block = footnotes
            .iter()
            .enumerate()
            .map(|(i, url)| format!("[{}]: {url}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        content.push_str(&format!("\n\n## References\n\n{block}"));
    }

    Article {
        topic: topic.to_string(),
        content,
        footnotes,
    }
}

fn order_sections<'a>(outline: &Outline, sections: &'a [WikiSection]) -> Vec<&'a WikiSection> {
    let mut ordered = Vec::with_capacity(sections.len());
    let mut used = vec![false; sections.len()];

    for outline_section in &outline.sections {
        if let Some((index, section)) = sections
            .iter()
            .enumerate()
            .find(|(i, s)| !used[*i] && s.title.eq_ignore_ascii_case(&outline_section.title))
        {
            used[index] = true;
            ordered.push(section);
        }
    }
    for (index, section) in sections.iter().enumerate() {
        if !used[index] {
            ordered.push(section);
        }
    }
    ordered
}

fn dedup_footnotes(sections: &[&WikiSection]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut footnotes = Vec::new();
    for section in sections {
        for url in &section.sources {
            if seen.insert(url.clone()) {
                footnotes.push(url.clone());
            }
        }
    }
    footnotes
}
