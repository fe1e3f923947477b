//! Orchestrator HTTP server
//!
//! Exposes the [`Registry`] over HTTP/JSON.

pub mod api;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ShareError;
use crate::registry::Registry;

pub use api::ApiError;

/// Build the orchestrator router
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/handshake", post(handlers::handshake))
        .route("/list", get(handlers::list))
        .route("/peers", get(handlers::peers))
        .route("/disconnect", post(handlers::disconnect))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// Serve the orchestrator on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, registry: Arc<Registry>, shutdown: F) -> Result<(), ShareError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("Orchestrator listening on {}", local_addr);

    axum::serve(listener, router(registry))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            error!("Orchestrator server failed: {}", e);
            ShareError::network_unavailable_full("Orchestrator server failed", local_addr.to_string(), e.to_string())
        })?;

    info!("Orchestrator stopped");
    Ok(())
}
