//! Prompt templates for the pipeline stages
//!
//! All prompts live here so the stage modules stay readable. The JSON
//! guidelines block is shared by every structured call; each stage
//! splices in the payload's own format instructions.

/// Shared guidelines appended to every prompt that requests JSON.
pub fn json_guidelines(format_instructions: &str) -> String {
    format!(
        "\n\nIMPORTANT: Your response must be in valid JSON format. Follow these guidelines:\
         \n- Use double quotes for all strings\
         \n- Ensure all keys and values are properly enclosed\
         \n- Do not include any text outside of the JSON object\
         \n- Strictly adhere to the following JSON schema:\
         \n{format_instructions}\
         \n\nDouble-check your output to ensure it is valid JSON before submitting."
    )
}

/// System prompt for the initial outline draft.
pub fn outline_system(format_instructions: &str) -> String {
    format!(
        "You are a Wikipedia writer. Write an outline for a Wikipedia page about a \
         user-provided topic. Be comprehensive and specific.{}",
        json_guidelines(format_instructions)
    )
}

/// Prompt for the related-subjects survey.
pub fn related_subjects_prompt(topic: &str, format_instructions: &str) -> String {
    format!(
        "I'm writing a Wikipedia page for a topic mentioned below. Please identify and \
         recommend some Wikipedia pages on closely related subjects. I'm looking for \
         examples that provide insights into interesting aspects commonly associated with \
         this topic, or examples that help me understand the typical content and structure \
         included in Wikipedia pages for similar topics.\n\
         List as many subjects as you can.\n\
         [Requirements]\n\
         - No explanations, greetings, or other unnecessary words. Output only in strict JSON data format{}\n\
         Topic of interest: {topic}",
        json_guidelines(format_instructions)
    )
}

/// System prompt for selecting the editor perspectives.
pub fn perspectives_system(examples: &str, format_instructions: &str) -> String {
    format!(
        "You need to select a diverse (and distinct) group of Wikipedia editors who will \
         work together to create a comprehensive article on the topic. Each of them \
         represents a different perspective, role, or affiliation related to this topic. \
         You can use other Wikipedia pages of related topics for inspiration. For each \
         editor, add a description of what they will focus on.\n\
         [Requirements]\n\
         - No explanations, greetings, or other unnecessary words. Output only in strict JSON data format{}\n\
         Wiki page outlines of related topics for inspiration:\n{examples}",
        json_guidelines(format_instructions)
    )
}

/// System prompt for the editor's next question, biased by the persona.
pub fn question_system(persona: &str) -> String {
    format!(
        "You are an experienced Wikipedia writer and want to edit a specific page. \
         Besides your identity as a Wikipedia writer, you have a specific focus when \
         researching the topic. Now, you are chatting with an expert to get information. \
         Ask good questions to get more useful information.\n\n\
         When you have no more questions to ask, say \"Thank you so much for your help!\" \
         to end the conversation. Please only ask one question at a time and don't ask \
         what you have asked before. Your questions should be related to the topic you \
         want to write. Be comprehensive and curious, gaining as much unique insight from \
         the expert as possible.\n\n\
         Stay true to your specific perspective:\n\n{persona}"
    )
}

/// System prompt for generating search queries.
pub fn queries_system(format_instructions: &str) -> String {
    format!(
        "You are a helpful research assistant. Query the search engine to answer the \
         user's questions.{}",
        json_guidelines(format_instructions)
    )
}

/// System prompt for the expert's cited answer.
pub fn answer_system(format_instructions: &str) -> String {
    format!(
        "You are an expert who can use information effectively. You are chatting with a \
         Wikipedia writer who wants to write a Wikipedia page on the topic you know. You \
         have gathered the related information and will now use the information to form a \
         response.\n\n\
         Make your response as informative as possible and make sure every sentence is \
         supported by the gathered information. Each response must be backed up by a \
         citation from a reliable source, formatted as a footnote, reproducing the URLs \
         after your response.{}",
        json_guidelines(format_instructions)
    )
}

/// System prompt for refining the outline from the interview transcripts.
pub fn refine_system(topic: &str, old_outline: &str, format_instructions: &str) -> String {
    format!(
        "You are a Wikipedia writer. You have gathered information from experts and \
         search engines. Now, you are refining the outline of the Wikipedia page. You \
         need to make sure that the outline is comprehensive and specific.\n\
         Topic you are writing about: {topic}\n\n\
         Old outline:\n\n{old_outline}{}",
        json_guidelines(format_instructions)
    )
}

/// User prompt carrying the formatted interview transcripts.
pub fn refine_user(conversations: &str) -> String {
    format!(
        "Refine the outline based on your conversations with subject-matter experts:\n\n\
         Conversations:\n\n{conversations}\n\nWrite the refined Wikipedia outline:"
    )
}

/// System prompt for drafting one section against retrieved references.
pub fn section_system(outline: &str, docs: &str, format_instructions: &str) -> String {
    format!(
        "You are an expert Wikipedia writer. Complete your assigned WikiSection from the \
         following outline:\n\n{outline}\n\n\
         Cite your sources, using the following references:\n\n<Documents>\n{docs}\n</Documents>{}",
        json_guidelines(format_instructions)
    )
}

/// User prompt naming the section to write.
pub fn section_user(section: &str) -> String {
    format!("Write the full WikiSection for the {section} section.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_guidelines_embed_instructions() {
        let block = json_guidelines(r#"{"queries": [...]}"#);
        assert!(block.contains(r#"{"queries": [...]}"#));
        assert!(block.contains("valid JSON"));
    }

    #[test]
    fn test_question_system_carries_persona() {
        let prompt = question_system("Focus on compiler internals.");
        assert!(prompt.ends_with("Focus on compiler internals."));
        assert!(prompt.contains("Thank you so much for your help!"));
    }
}
