//! Persistent corpus storage

mod corpus;

pub use corpus::CorpusStore;
