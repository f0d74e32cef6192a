//! HTTP API over the matcher

pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::{MatcherError, Result};
use crate::processing::matcher::Matcher;
use handlers::{health_handler, match_handler, root_handler, skills_handler};

/// Multipart framing on top of the configured upload limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub matcher: Arc<Matcher>,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/skills", get(skills_handler))
        .route("/match", post(match_handler))
        .layer(DefaultBodyLimit::max(
            max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ))
        .with_state(state)
}

/// Bind, start loading the model in the background and serve until shutdown.
pub async fn serve(matcher: Arc<Matcher>, config: &ServerConfig) -> Result<()> {
    let warm = Arc::clone(&matcher);
    tokio::spawn(async move {
        match warm.warm_up_async().await {
            Ok(()) => log::info!("Embedding model ready"),
            Err(e) => log::error!("Model warm-up failed, will retry on first request: {}", e),
        }
    });

    let app = create_router(AppState { matcher }, config.max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MatcherError::Internal(format!("Server error: {}", e)))?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
