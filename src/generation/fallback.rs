//! Quality gate and fallback answer composition
//!
//! When the generation call fails, or succeeds but returns a recognizably
//! useless answer, the user still gets grounded content: a fixed apology
//! followed by the raw passage context.

/// Fixed apology prefix of every fallback answer
pub const APOLOGY: &str =
    "Sorry, I had trouble generating a concise answer. Here are relevant passages:";

/// Literal markers of a low-quality generated answer.
///
/// Substring matching on these phrases is a fragile heuristic carried over
/// from the deployed behavior; it is isolated here so the strategy can be
/// swapped without touching the fallback mechanism. Note the first marker
/// uses a typographic apostrophe, exactly as upstream models emit it.
const LOW_QUALITY_MARKERS: &[&str] = &["I\u{2019}m sorry", "Based on the provided context"];

/// Whether a generated answer should be discarded in favor of the fallback
pub fn is_low_quality(answer: &str) -> bool {
    if answer.trim().is_empty() {
        return true;
    }
    LOW_QUALITY_MARKERS.iter().any(|marker| answer.contains(marker))
}

/// Compose the fallback answer: apology, separator, and the passage context
/// truncated to `max_context_chars` characters
pub fn fallback_answer(context: &str, max_context_chars: usize) -> String {
    format!("{}\n\n---\n\n{}", APOLOGY, truncate_chars(context, max_context_chars))
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer_is_low_quality() {
        assert!(is_low_quality(""));
        assert!(is_low_quality("   \n"));
    }

    #[test]
    fn test_apologetic_non_answer_is_low_quality() {
        assert!(is_low_quality("I\u{2019}m sorry, I cannot help with that."));
    }

    #[test]
    fn test_context_echo_is_low_quality() {
        assert!(is_low_quality("Based on the provided context, the answer is unclear."));
    }

    #[test]
    fn test_substantive_answer_passes_the_gate() {
        assert!(!is_low_quality("Use pandas for dataframes (Passage 1)."));
    }

    #[test]
    fn test_fallback_answer_shape() {
        let answer = fallback_answer("(Passage 1) Use pandas for dataframes", 1500);
        assert!(answer.starts_with(APOLOGY));
        assert!(answer.contains("---"));
        assert!(answer.contains("pandas"));
    }

    #[test]
    fn test_fallback_context_is_truncated() {
        let context = "x".repeat(5000);
        let answer = fallback_answer(&context, 1500);
        let dumped = answer.split("---\n\n").nth(1).unwrap();
        assert_eq!(dumped.chars().count(), 1500);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 3), "hél");
    }
}
