//! HTTP API for summarizing pasted text and uploaded documents.
//!
//! Routes:
//! - `POST /api/summarize` (multipart form, urlencoded form, or JSON)
//! - `GET /` service banner
//! - `GET /health`

mod error;
mod handlers;
mod routes;

pub use error::ApiError;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use briefly_core::{AppConfig, Summarizer, TextExtractor};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
    pub extractor: Arc<TextExtractor>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            summarizer: Arc::new(Summarizer::new(config)?),
            extractor: Arc::new(TextExtractor::new(&config.extract)),
        })
    }
}

/// Start the web server and run until Ctrl+C.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config)?;

    if state.summarizer.stub_mode() {
        tracing::info!("Stub mode enabled, no provider will be called");
    } else {
        tracing::info!(
            "Provider order: {}",
            state.summarizer.provider_order().join(" -> ")
        );
    }

    let app = create_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
