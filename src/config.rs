//! Configuration for the virtual TA

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chat completion / LLM configuration
    pub llm: LlmConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Paths to the corpus database and index artifacts
    pub artifacts: ArtifactsConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing sections
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&contents).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load from the path in `COURSE_TA_CONFIG` if set, otherwise defaults
    pub fn from_env() -> Result<Self> {
        match std::env::var("COURSE_TA_CONFIG") {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Embedding configuration
///
/// The same embedding server and model must be used for the offline build and
/// for query-time embedding; the model identifier is pinned into the index
/// artifact and checked at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding server base URL (Ollama-compatible)
    pub base_url: String,
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (384 for bge-small / MiniLM class models)
    pub dimensions: usize,
    /// Batch size for the offline build
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "bge-small-en-v1.5".to_string(),
            dimensions: 384,
            batch_size: 32,
            timeout_secs: 30,
        }
    }
}

/// Chat completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completion API base URL
    pub base_url: String,
    /// Bearer credential; falls back to the `AIPIPE_API_KEY` environment
    /// variable when empty
    pub api_key: Option<String>,
    /// Generation model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Request timeout in seconds; a stalled upstream fails the call and the
    /// fallback policy applies
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.aipipe.ai/v1".to_string(),
            api_key: None,
            model: "llama3-8b-instruct".to_string(),
            temperature: 0.2,
            max_tokens: 512,
            timeout_secs: 25,
        }
    }
}

impl LlmConfig {
    /// Resolve the bearer credential from config or environment
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        std::env::var("AIPIPE_API_KEY")
            .map_err(|_| Error::Config("AIPIPE_API_KEY is missing".to_string()))
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000 }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
    /// Character budget for the passage dump in fallback answers
    pub fallback_context_chars: usize,
    /// Character budget for link previews
    pub preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 6,
            fallback_context_chars: 1500,
            preview_chars: 120,
        }
    }
}

/// Locations of the corpus database and persisted index artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// SQLite corpus database path
    pub db_path: PathBuf,
    /// Directory holding `index.json` and `ids.json`
    pub index_dir: PathBuf,
    /// Directory with `course.json` / `discourse.json` for the build step
    pub data_dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("knowledge_base.db"),
            index_dir: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
        }
    }
}
