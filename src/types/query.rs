//! Query request types

use serde::{Deserialize, Serialize};

/// Query request accepted by the HTTP boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,

    /// Optional base64-encoded image; acknowledged in the answer but never
    /// analyzed
    #[serde(default)]
    pub image: Option<String>,
}

impl QueryRequest {
    /// Create a new text-only query
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            image: None,
        }
    }
}
