//! Prompt construction and the answer fallback policy

mod fallback;
mod prompt;

pub use fallback::{fallback_answer, is_low_quality, APOLOGY};
pub use prompt::{build_context, build_prompt};
