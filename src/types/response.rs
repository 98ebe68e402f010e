//! Response types for answered queries

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Citation link back to a retrieved passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source URL of the passage
    pub url: String,
    /// Shortened one-line preview of the passage text
    #[serde(rename = "text")]
    pub preview: String,
}

impl Link {
    /// Build a link from a retrieved chunk, collapsing whitespace and
    /// shortening the preview to `max_chars` at a word boundary
    pub fn from_chunk(chunk: &Chunk, max_chars: usize) -> Self {
        Self {
            url: chunk.source_url.clone(),
            preview: shorten(&chunk.text, max_chars),
        }
    }
}

/// Answer returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Generated (or fallback) answer text
    pub answer: String,
    /// One link per retrieved passage, in similarity-rank order
    pub links: Vec<Link>,
}

impl AnswerResponse {
    /// Fixed response when retrieval finds nothing usable
    pub fn no_relevant_documents() -> Self {
        Self {
            answer: "I couldn't find any relevant documents.".to_string(),
            links: Vec::new(),
        }
    }
}

/// Collapse whitespace and shorten to at most `max_chars` characters,
/// breaking at a word boundary with a `…` placeholder
fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    // Reserve one character for the placeholder, then back up to the last
    // full word that fits.
    let budget = max_chars.saturating_sub(1);
    let mut out = String::new();
    for word in collapsed.split(' ') {
        let needed = if out.is_empty() {
            word.chars().count()
        } else {
            word.chars().count() + 1
        };
        if out.chars().count() + needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push('…');
    out
}
