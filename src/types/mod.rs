//! Core types for chunks, queries, and responses

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Partition, SourceDocument};
pub use query::QueryRequest;
pub use response::{AnswerResponse, Link};
