//! Query pipeline: retrieval, prompting, generation, and the fallback policy
//!
//! All serving state lives in an explicitly constructed, immutable
//! [`RagContext`] passed to every query. Nothing here mutates shared state,
//! so concurrent queries need no locking.

use base64::Engine;
use std::io::Write;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{build_context, build_prompt, fallback_answer, is_low_quality};
use crate::index::IndexArtifacts;
use crate::providers::{AipipeClient, ChatProvider, EmbeddingProvider, OllamaEmbedder};
use crate::retrieval::Retriever;
use crate::storage::CorpusStore;
use crate::types::{AnswerResponse, Link};

/// Fixed acknowledgment appended when a query carries an image payload
const IMAGE_NOTE: &str = "Image received (current version does not analyze images).";

/// Immutable per-process serving context
pub struct RagContext {
    config: RagConfig,
    retriever: Retriever,
    chat: Arc<dyn ChatProvider>,
}

impl RagContext {
    /// Initialize the production context: open the corpus store, load the
    /// index artifacts, and construct the HTTP providers.
    ///
    /// Fails fast on missing or mismatched artifacts, an unreachable corpus
    /// database, or a missing API credential; the service must not come up
    /// partially initialized.
    pub fn initialize(config: RagConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> =
            Arc::new(OllamaEmbedder::new(&config.embeddings)?);
        let chat: Arc<dyn ChatProvider> = Arc::new(AipipeClient::new(&config.llm)?);

        let store = Arc::new(CorpusStore::open(&config.artifacts.db_path)?);
        // Probe the database so an unreachable corpus aborts startup here
        // rather than on the first query.
        let counts = store.partition_counts()?;
        for (table, count) in &counts {
            tracing::info!("Corpus partition {}: {} chunks", table, count);
        }

        let artifacts = Arc::new(IndexArtifacts::load(
            &config.artifacts.index_dir,
            embedder.dimensions(),
        )?);

        let retriever = Retriever::new(embedder, artifacts, store);
        Ok(Self {
            config,
            retriever,
            chat,
        })
    }

    /// Assemble a context from pre-built parts (fixture providers in tests,
    /// alternative backends in binaries)
    pub fn with_providers(
        config: RagConfig,
        store: Arc<CorpusStore>,
        artifacts: Arc<IndexArtifacts>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
    ) -> Self {
        let retriever = Retriever::new(embedder, artifacts, store);
        Self {
            config,
            retriever,
            chat,
        }
    }

    /// Server configuration, for the HTTP boundary
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Answer a question, optionally accompanied by a base64 image payload.
    ///
    /// Retrieval failures propagate; generation failures and low-quality
    /// answers are absorbed by the fallback policy so the caller always
    /// receives grounded content.
    pub async fn answer(&self, question: &str, image: Option<&str>) -> Result<AnswerResponse> {
        let retrieval = &self.config.retrieval;
        let chunks = self.retriever.retrieve(question, retrieval.top_k).await?;

        if chunks.is_empty() {
            return Ok(AnswerResponse::no_relevant_documents());
        }

        let links: Vec<Link> = chunks
            .iter()
            .map(|chunk| Link::from_chunk(chunk, retrieval.preview_chars))
            .collect();

        let context = build_context(&chunks);
        let prompt = build_prompt(&context, question);

        let mut answer = match self.chat.generate(&prompt).await {
            Ok(text) if !is_low_quality(&text) => text,
            Ok(_) => {
                tracing::warn!("Discarding low-quality generated answer, applying fallback");
                fallback_answer(&context, retrieval.fallback_context_chars)
            }
            Err(e) => {
                tracing::warn!("Generation failed ({}), applying fallback", e);
                fallback_answer(&context, retrieval.fallback_context_chars)
            }
        };

        if let Some(image_b64) = image {
            answer.push_str("\n\n");
            answer.push_str(&handle_image(image_b64));
        }

        Ok(AnswerResponse { answer, links })
    }
}

/// Decode and stash the uploaded image, returning the note to append to the
/// answer. Image content never influences retrieval or generation.
fn handle_image(image_b64: &str) -> String {
    match save_image(image_b64) {
        Ok(path) => {
            tracing::debug!("Saved uploaded image to {}", path);
            IMAGE_NOTE.to_string()
        }
        Err(e) => format!("Image could not be processed: {}", e),
    }
}

fn save_image(image_b64: &str) -> anyhow::Result<String> {
    let data = base64::engine::general_purpose::STANDARD.decode(image_b64)?;
    let mut file = tempfile::Builder::new().suffix(".img").tempfile()?;
    file.write_all(&data)?;
    let (_, path) = file.keep()?;
    Ok(path.display().to_string())
}
