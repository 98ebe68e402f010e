//! HTTP boundary exposing the query pipeline

pub mod routes;
pub mod state;

use axum::{routing::get, routing::post, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::pipeline::RagContext;
use state::AppState;

/// Virtual TA HTTP server
pub struct TaServer {
    config: RagConfig,
    state: AppState,
}

impl TaServer {
    /// Initialize the serving context and wrap it in a server.
    ///
    /// Initialization is fail-fast: missing index artifacts, a dimensionality
    /// mismatch, or an unreachable corpus abort here, before the listener
    /// binds.
    pub fn new(config: RagConfig) -> Result<Self> {
        let context = RagContext::initialize(config.clone())?;
        Ok(Self {
            config,
            state: AppState::new(context),
        })
    }

    fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(routes::health))
            .route("/", post(routes::ask))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start serving
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting virtual TA server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// The configured listen address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}
