//! Chunk and source document types with provenance tracking

use serde::{Deserialize, Serialize};

/// Corpus partition a chunk was ingested into
///
/// Both partitions share one schema; they are kept separate so provenance
/// survives into citations. Chunk ids are globally unique across partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Course pages scraped from the course site (markdown)
    Course,
    /// Forum (Discourse) posts
    Forum,
}

impl Partition {
    /// SQLite table backing this partition
    pub fn table(&self) -> &'static str {
        match self {
            Self::Course => "markdown_chunks",
            Self::Forum => "discourse_chunks",
        }
    }
}

/// The atomic retrievable unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique id, derived as `{document_id}_{chunk_index}`; stable across
    /// rebuilds as long as source content and chunk boundaries are unchanged
    pub id: String,
    /// Original URL for citation
    pub source_url: String,
    /// Zero-based position within the source document
    pub chunk_index: u32,
    /// Chunk contents, at most the configured character budget
    pub text: String,
    /// Embedding vector; `None` until the build step has run, meaning the
    /// chunk is not yet searchable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// Create a chunk with a derived id
    pub fn new(document_id: &str, source_url: &str, chunk_index: u32, text: String) -> Self {
        Self {
            id: format!("{}_{}", document_id, chunk_index),
            source_url: source_url.to_string(),
            chunk_index,
            text,
            embedding: None,
        }
    }
}

/// A source document handed to the ingestion step
///
/// The forum export uses `raw` for its body field; the course export uses
/// `text`. Both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Document id (course page slug or forum post id)
    pub id: String,
    /// Original URL
    #[serde(default)]
    pub url: String,
    /// Full document text
    #[serde(default, alias = "raw")]
    pub text: String,
}
