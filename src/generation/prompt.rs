//! Grounded prompt construction with numbered passages

use crate::types::Chunk;

/// Marker for an embedded markdown image; passage text is cut at the first
/// occurrence since images cannot be rendered in the textual prompt
const IMAGE_MARKER: &str = "![";

/// Build the numbered passage context from retrieved chunks, in rank order.
///
/// Each passage is flattened to one line and tagged with its 1-based rank so
/// the model can cite it as "(Passage N)".
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("(Passage {}) {}", i + 1, clean_passage(&chunk.text)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full prompt from the passage context and the question
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful TA for IIT-M's Tools in Data Science course.\n\
         Use the following forum passages to answer the student's question. \
         Be concise (3-4 sentences) and cite passage numbers like (Passage 2) if needed.\n\n\
         {context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}

fn clean_passage(text: &str) -> String {
    let flattened = text.replace('\n', " ");
    let flattened = flattened.trim();
    match flattened.find(IMAGE_MARKER) {
        Some(pos) => flattened[..pos].to_string(),
        None => flattened.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id_prefix: &str, text: &str) -> Chunk {
        Chunk::new(id_prefix, "http://x", 0, text.to_string())
    }

    #[test]
    fn test_passages_numbered_in_rank_order() {
        let chunks = vec![chunk("a", "first passage"), chunk("b", "second passage")];
        let context = build_context(&chunks);
        let p1 = context.find("(Passage 1) first passage").unwrap();
        let p2 = context.find("(Passage 2) second passage").unwrap();
        assert!(p1 < p2);
    }

    #[test]
    fn test_newlines_flattened() {
        let context = build_context(&[chunk("a", "line one\nline two")]);
        assert_eq!(context, "(Passage 1) line one line two");
    }

    #[test]
    fn test_passage_truncated_at_image_marker() {
        let context = build_context(&[chunk("a", "see the chart ![chart](img.png) below")]);
        assert_eq!(context, "(Passage 1) see the chart ");
        assert!(!context.contains("img.png"));
    }

    #[test]
    fn test_prompt_contains_context_question_and_cue() {
        let prompt = build_prompt("(Passage 1) pandas", "What tool for dataframes?");
        assert!(prompt.contains("(Passage 1) pandas"));
        assert!(prompt.contains("Question: What tool for dataframes?"));
        assert!(prompt.ends_with("Answer:"));
    }
}
