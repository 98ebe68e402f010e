//! course-ta: retrieval-augmented virtual TA for course and forum content
//!
//! Offline, a build step chunks scraped course pages and forum posts into a
//! SQLite corpus, embeds every chunk, and persists a flat inner-product index
//! together with an ordinal-to-chunk-id map. At query time the pipeline embeds
//! the question, pulls the nearest chunks back out of the corpus, and asks a
//! chat-completion API for a grounded answer with passage citations, falling
//! back to the raw passages whenever generation fails or degrades.

pub mod config;
pub mod error;
pub mod generation;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::RagContext;
pub use types::{
    document::{Chunk, Partition, SourceDocument},
    query::QueryRequest,
    response::{AnswerResponse, Link},
};
