//! Offline ingestion: chunking source documents and building index artifacts

mod build;
mod chunker;

pub use build::{build_index, ingest_documents, load_documents};
pub use chunker::chunk_document;
