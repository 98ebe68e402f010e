//! Virtual TA server binary
//!
//! Run with: cargo run --bin course-ta-server

use course_ta::{config::RagConfig, server::TaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_ta=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {} ({} dims)", config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - Generation model: {}", config.llm.model);
    tracing::info!("  - Corpus database: {}", config.artifacts.db_path.display());
    tracing::info!("  - Index artifacts: {}", config.artifacts.index_dir.display());

    let server = TaServer::new(config)?;

    println!("Virtual TA ready");
    println!("  Health:   http://{}/health", server.address());
    println!("  Ask:      POST http://{}/  {{\"question\": \"...\", \"image\": null}}", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
