//! Provider abstractions for embeddings and chat completion
//!
//! Trait-based seams so the pipeline can run against the production HTTP
//! backends or against fixture providers in tests.

pub mod aipipe;
pub mod chat;
pub mod embedding;
pub mod ollama;

pub use aipipe::AipipeClient;
pub use chat::ChatProvider;
pub use embedding::EmbeddingProvider;
pub use ollama::OllamaEmbedder;
