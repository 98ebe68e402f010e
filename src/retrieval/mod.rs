//! Query-time retrieval: embed, search, and resolve ordinals to corpus rows

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::index::IndexArtifacts;
use crate::providers::EmbeddingProvider;
use crate::storage::CorpusStore;
use crate::types::Chunk;

/// Retriever over the loaded index artifacts and corpus store
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    artifacts: Arc<IndexArtifacts>,
    store: Arc<CorpusStore>,
}

impl Retriever {
    /// Create a retriever over shared, read-only serving state
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        artifacts: Arc<IndexArtifacts>,
        store: Arc<CorpusStore>,
    ) -> Self {
        Self {
            embedder,
            artifacts,
            store,
        }
    }

    /// Retrieve the top-`k` chunks for a query, in similarity-rank order.
    ///
    /// Ordinals are resolved to chunk ids via the id map (a missing entry is
    /// index corruption and fails the query), then all ids are fetched from
    /// the corpus in one batched call and re-sorted into the index's rank
    /// order, since the store does not guarantee return order. Ids with no
    /// matching row (index/store drift) are dropped and logged.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        if self.artifacts.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        let hits = self.artifacts.index.search(&query_vector, k)?;

        let mut ranked_ids = Vec::with_capacity(hits.len());
        for (ordinal, _score) in &hits {
            let id = self.artifacts.id_map.get(*ordinal).ok_or_else(|| {
                Error::Index(format!("Ordinal {} has no entry in the id map", ordinal))
            })?;
            ranked_ids.push(id.to_string());
        }

        let rows = self.store.fetch_by_ids(&ranked_ids)?;
        let mut by_id: HashMap<String, Chunk> =
            rows.into_iter().map(|chunk| (chunk.id.clone(), chunk)).collect();

        let mut ordered = Vec::with_capacity(ranked_ids.len());
        for id in &ranked_ids {
            match by_id.remove(id) {
                Some(chunk) => ordered.push(chunk),
                None => {
                    tracing::warn!("Chunk {} is in the index but not in the corpus store", id);
                }
            }
        }

        if ordered.is_empty() && !ranked_ids.is_empty() {
            tracing::warn!(
                "All {} retrieved ids were missing from the corpus store",
                ranked_ids.len()
            );
        }

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{FlatIndex, IdMap};
    use crate::types::Partition;
    use async_trait::async_trait;

    /// Fixture embedder with canned vectors per text
    struct FixtureEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixtureEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| Error::Embedding(format!("No fixture vector for {:?}", text)))
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model(&self) -> &str {
            "fixture"
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    fn setup(ids: Vec<&str>, vectors: Vec<Vec<f32>>, rows: Vec<(&str, &str, &str)>) -> Retriever {
        let mut index = FlatIndex::new("fixture", 2);
        index.add(vectors).unwrap();
        let id_map = IdMap::from_ids(ids.into_iter().map(String::from).collect());
        let artifacts = IndexArtifacts::new(index, id_map).unwrap();

        let store = CorpusStore::in_memory().unwrap();
        for (id, url, text) in rows {
            let (doc, idx) = id.rsplit_once('_').unwrap();
            let chunk = Chunk::new(doc, url, idx.parse().unwrap(), text.to_string());
            store.upsert_chunks(Partition::Course, &[chunk]).unwrap();
        }

        let embedder = FixtureEmbedder {
            vectors: [("query".to_string(), vec![1.0, 0.0])].into_iter().collect(),
        };

        Retriever::new(Arc::new(embedder), Arc::new(artifacts), Arc::new(store))
    }

    #[tokio::test]
    async fn test_preserves_rank_order_after_id_resolution() {
        // b_0 is more similar than a_0; store insertion order is a then b.
        let retriever = setup(
            vec!["a_0", "b_0"],
            vec![vec![0.2, 0.0], vec![0.9, 0.0]],
            vec![
                ("a_0", "http://x/a", "git notes"),
                ("b_0", "http://x/b", "pandas notes"),
            ],
        );
        let chunks = retriever.retrieve("query", 2).await.unwrap();
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b_0", "a_0"]);
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty() {
        let index = FlatIndex::new("fixture", 2);
        let artifacts = IndexArtifacts::new(index, IdMap::default()).unwrap();
        let store = CorpusStore::in_memory().unwrap();
        let embedder = FixtureEmbedder {
            vectors: HashMap::new(),
        };
        let retriever = Retriever::new(Arc::new(embedder), Arc::new(artifacts), Arc::new(store));

        assert!(retriever.retrieve("query", 6).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drifted_row_is_dropped_not_fatal() {
        let retriever = setup(
            vec!["a_0", "gone_0"],
            vec![vec![0.2, 0.0], vec![0.9, 0.0]],
            vec![("a_0", "http://x/a", "still here")],
        );
        let chunks = retriever.retrieve("query", 2).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "a_0");
    }

    #[tokio::test]
    async fn test_missing_id_map_entry_fails_the_query() {
        // Hand-build artifacts whose map is shorter than the index can return.
        let mut index = FlatIndex::new("fixture", 2);
        index.add(vec![vec![1.0, 0.0], vec![0.5, 0.0]]).unwrap();
        let id_map = IdMap::from_ids(vec!["a_0".to_string(), "b_0".to_string()]);
        let mut artifacts = IndexArtifacts::new(index, id_map).unwrap();
        artifacts.id_map = IdMap::from_ids(vec!["a_0".to_string()]);

        let store = CorpusStore::in_memory().unwrap();
        let embedder = FixtureEmbedder {
            vectors: [("query".to_string(), vec![1.0, 0.0])].into_iter().collect(),
        };
        let retriever = Retriever::new(Arc::new(embedder), Arc::new(artifacts), Arc::new(store));

        assert!(retriever.retrieve("query", 2).await.is_err());
    }
}
