//! Embedding provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for generating text embeddings
///
/// The same provider (model and preprocessing) must be used when building the
/// index and when embedding incoming queries; divergence silently degrades
/// retrieval quality instead of erroring, which is why the model identifier is
/// pinned into the persisted index and checked at load time.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensionality (e.g. 384 for bge-small-en-v1.5)
    fn dimensions(&self) -> usize;

    /// Model identifier, pinned into the index artifact
    fn model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &str;
}
