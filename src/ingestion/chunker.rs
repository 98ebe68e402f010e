//! Fixed-budget text chunking with stable, derivable ids

use unicode_segmentation::UnicodeSegmentation;

use crate::types::Chunk;

/// Split a document into chunks of at most `chunk_size` characters.
///
/// Runs of whitespace collapse to single spaces and splits happen at word
/// boundaries, so no chunk begins or ends mid-word; a single word longer than
/// the budget is hard-split at grapheme boundaries. Empty or whitespace-only
/// documents produce no chunks. Re-running on unchanged input yields the same
/// ids and texts, which keeps re-ingestion safe.
pub fn chunk_document(
    document_id: &str,
    source_url: &str,
    text: &str,
    chunk_size: usize,
) -> Vec<Chunk> {
    assert!(chunk_size > 0, "chunk_size must be positive");

    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > chunk_size {
            // Oversized word: flush what we have, then hard-split the word.
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            for piece in split_oversized(word, chunk_size) {
                pieces.push(piece);
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { word_len + 1 };
        if current_len + needed > chunk_size {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(idx, piece)| Chunk::new(document_id, source_url, idx as u32, piece))
        .collect()
}

/// Hard-split a single oversized word into budget-sized pieces at grapheme
/// boundaries
fn split_oversized(word: &str, chunk_size: usize) -> Vec<String> {
    let graphemes: Vec<&str> = word.graphemes(true).collect();
    graphemes
        .chunks(chunk_size)
        .map(|g| g.concat())
        .collect()
}
