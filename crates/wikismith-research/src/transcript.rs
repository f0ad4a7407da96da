//! Speaker-relative transcript views
//!
//! One model plays both conversational roles over a single shared
//! transcript. The canonical transcript tags every generated message as
//! Assistant with the speaker's name; before calling the model as
//! speaker X, the view for X flips the role of every message X did not
//! author. This is an explicit pure transform, not an inline mutation:
//! the canonical transcript is never modified.

use wikismith_foundation::llm::types::{ChatMessage, Role};

/// Project the transcript into `speaker`'s point of view.
///
/// Messages authored by `speaker` keep their role; every other message
/// has Assistant and User swapped, so the model sees its own past
/// contributions as "assistant" and everyone else's as "user". System
/// and tool messages are untouched.
///
/// Applying the transform twice with the same speaker returns the
/// original attribution for every message.
pub fn swap_roles(messages: &[ChatMessage], speaker: &str) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|message| {
            if message.is_from(speaker) {
                return message.clone();
            }
            let mut swapped = message.clone();
            swapped.role = match message.role {
                Role::Assistant => Role::User,
                Role::User => Role::Assistant,
                other => other,
            };
            swapped
        })
        .collect()
}

/// Attribute a freshly generated message to a speaker.
pub fn tag_with_name(mut message: ChatMessage, name: &str) -> ChatMessage {
    message.name = Some(name.to_string());
    message
}
