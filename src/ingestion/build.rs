//! Offline corpus ingestion and index building
//!
//! A single-writer batch process: chunk the scraped document collections into
//! the corpus partitions, embed every row in stable order, and assemble the
//! index/id-map pair. Artifacts are only swapped into the serving path by the
//! atomic save in [`IndexArtifacts::save`]; a failed build is retried from
//! scratch.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::index::{FlatIndex, IdMap, IndexArtifacts};
use crate::ingestion::chunk_document;
use crate::providers::EmbeddingProvider;
use crate::storage::CorpusStore;
use crate::types::{Partition, SourceDocument};

/// Load a scraped document collection from a JSON array of `{id, url, text}`
pub fn load_documents(path: impl AsRef<Path>) -> Result<Vec<SourceDocument>> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        Error::Config(format!(
            "Failed to read {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Chunk a document collection into a corpus partition.
///
/// Documents with empty or whitespace-only bodies are skipped entirely; they
/// must not leave stray empty rows. Returns the number of chunks upserted.
pub fn ingest_documents(
    store: &CorpusStore,
    partition: Partition,
    documents: &[SourceDocument],
    chunk_size: usize,
) -> Result<usize> {
    let mut total = 0;
    for doc in documents {
        let chunks = chunk_document(&doc.id, &doc.url, &doc.text, chunk_size);
        total += store.upsert_chunks(partition, &chunks)?;
    }
    tracing::info!("Ingested {} chunks into {}", total, partition.table());
    Ok(total)
}

/// Embed every corpus row in stable order and assemble the index artifacts
pub async fn build_index(
    store: &CorpusStore,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
) -> Result<IndexArtifacts> {
    let rows = store.all_rows()?;
    let (ids, texts): (Vec<String>, Vec<String>) = rows.into_iter().unzip();

    tracing::info!(
        "Embedding {} chunks with model {} ({} dims)",
        ids.len(),
        embedder.model(),
        embedder.dimensions()
    );

    let mut index = FlatIndex::new(embedder.model(), embedder.dimensions());
    for (batch_no, batch) in texts.chunks(batch_size.max(1)).enumerate() {
        let vectors = embedder.embed_batch(batch).await?;
        index.add(vectors)?;
        tracing::debug!("Embedded batch {} ({} texts)", batch_no, batch.len());
    }

    IndexArtifacts::new(index, IdMap::from_ids(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic embedder: vector derived from text length
    struct CountingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.len() as f32, 1.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model(&self) -> &str {
            "counting"
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn docs(specs: &[(&str, &str)]) -> Vec<SourceDocument> {
        specs
            .iter()
            .map(|(id, text)| SourceDocument {
                id: id.to_string(),
                url: format!("http://x/{}", id),
                text: text.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_ingest_skips_empty_documents() {
        let store = CorpusStore::in_memory().unwrap();
        let count = ingest_documents(
            &store,
            Partition::Course,
            &docs(&[("a", "some content"), ("empty", "   ")]),
            1000,
        )
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.partition_counts().unwrap()[0].1, 1);
    }

    #[test]
    fn test_ids_unique_across_partitions() {
        let store = CorpusStore::in_memory().unwrap();
        let long = "word ".repeat(600);
        ingest_documents(&store, Partition::Course, &docs(&[("a", &long)]), 1000).unwrap();
        ingest_documents(&store, Partition::Forum, &docs(&[("b", &long)]), 1000).unwrap();

        let rows = store.all_rows().unwrap();
        let mut ids: Vec<_> = rows.iter().map(|(id, _)| id.clone()).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[tokio::test]
    async fn test_build_index_aligns_ordinals_with_ids() {
        let store = CorpusStore::in_memory().unwrap();
        ingest_documents(
            &store,
            Partition::Course,
            &docs(&[("a", "short"), ("b", "a bit longer text")]),
            1000,
        )
        .unwrap();

        let artifacts = build_index(&store, Arc::new(CountingEmbedder), 8)
            .await
            .unwrap();
        assert_eq!(artifacts.index.len(), 2);
        assert_eq!(artifacts.id_map.len(), 2);
        assert_eq!(artifacts.id_map.get(0), Some("a_0"));
        assert_eq!(artifacts.id_map.get(1), Some("b_0"));
    }

    #[tokio::test]
    async fn test_build_on_empty_corpus_is_valid_and_empty() {
        let store = CorpusStore::in_memory().unwrap();
        let artifacts = build_index(&store, Arc::new(CountingEmbedder), 8)
            .await
            .unwrap();
        assert!(artifacts.index.is_empty());
        assert!(artifacts.id_map.is_empty());
    }
}
