//! Offline build binary: chunk scraped collections into the corpus, embed
//! every chunk, and persist the index artifacts
//!
//! Run with: cargo run --bin build-index

use std::sync::Arc;

use course_ta::config::RagConfig;
use course_ta::ingestion::{build_index, ingest_documents, load_documents};
use course_ta::providers::{EmbeddingProvider, OllamaEmbedder};
use course_ta::storage::CorpusStore;
use course_ta::types::Partition;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_ta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::from_env()?;
    let store = CorpusStore::open(&config.artifacts.db_path)?;

    // Ingest whichever scraped collections are present.
    for (partition, filename) in [
        (Partition::Course, "course.json"),
        (Partition::Forum, "discourse.json"),
    ] {
        let path = config.artifacts.data_dir.join(filename);
        if path.exists() {
            let documents = load_documents(&path)?;
            tracing::info!("Loading {} ({} documents)", path.display(), documents.len());
            ingest_documents(&store, partition, &documents, config.chunking.chunk_size)?;
        } else {
            tracing::warn!("{} not found - skipping", path.display());
        }
    }

    for (table, count) in store.partition_counts()? {
        tracing::info!("{}: {} rows", table, count);
    }

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
    let artifacts = build_index(&store, embedder, config.embeddings.batch_size).await?;
    artifacts.save(&config.artifacts.index_dir)?;

    println!(
        "Build complete: {} chunks indexed into {}",
        artifacts.index.len(),
        config.artifacts.index_dir.display()
    );

    Ok(())
}
