//! Chat completion provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt-in, answer-out chat completion
///
/// A failed call is not retried here; the pipeline catches it once and applies
/// the fallback policy.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send the prompt and return the extracted answer text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logging
    fn model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &str;
}
