//! Instruction text sent to the generative model.

use crate::models::{CardCount, Language};

/// Cut `context` to at most `max_chars` characters without splitting a code point.
pub fn truncate_context(context: &str, max_chars: usize) -> &str {
    match context.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &context[..byte_idx],
        None => context,
    }
}

/// Build the prompt for either document text (`is_file`) or a bare topic.
pub fn build_prompt(context: &str, is_file: bool, language: Language, count: CardCount) -> String {
    if is_file {
        format!(
            "Analyze this text and extract {count} key concepts for flashcards.\n\
             Text: \"{context}...\"\n\
             IMPORTANT: Output language must be {language}.\n\
             Output STRICTLY a JSON Array of exactly {count} objects: \
             [{{\"front\": \"Question/Term\", \"back\": \"Answer/Definition\"}}].\n\
             No markdown."
        )
    } else {
        format!(
            "Create {count} flashcards about: \"{context}\".\n\
             IMPORTANT: Output language must be {language}.\n\
             Output STRICTLY a JSON Array of exactly {count} objects: \
             [{{\"front\": \"Question\", \"back\": \"Answer\"}}].\n\
             No markdown."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_prompt_names_topic_and_count() {
        let prompt = build_prompt("photosynthesis", false, Language::English, CardCount::clamped(6));
        assert!(prompt.starts_with("Create 6 flashcards about: \"photosynthesis\"."));
        assert!(prompt.contains("Output language must be English."));
        assert!(prompt.contains(r#"[{"front": "Question", "back": "Answer"}]"#));
        assert!(prompt.ends_with("No markdown."));
    }

    #[test]
    fn file_prompt_asks_for_key_concepts() {
        let prompt = build_prompt("chapter one", true, Language::Vietnamese, CardCount::default());
        assert!(prompt.starts_with("Analyze this text and extract 5 key concepts"));
        assert!(prompt.contains("Text: \"chapter one...\""));
        assert!(prompt.contains("Output language must be Vietnamese."));
        assert!(prompt.contains("Question/Term"));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ăâđêôơư".repeat(10);
        let cut = truncate_context(&text, 5);
        assert_eq!(cut, "ăâđêô");
        assert_eq!(truncate_context("short", 100), "short");
        assert_eq!(truncate_context("exact", 5), "exact");
        assert_eq!(truncate_context("", 3), "");
    }
}
