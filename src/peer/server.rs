//! Peer file server
//!
//! Serves `GET /download/{filename}` from the agent's shared folder. Holds no
//! mutable state, so concurrent downloads are independent.

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::error::ShareError;
use crate::peer::PeerAgent;
use crate::server::ApiError;

/// Build the file server router
pub fn router(agent: Arc<PeerAgent>) -> Router {
    Router::new()
        .route("/download/:filename", get(download))
        .with_state(agent)
}

async fn download(
    State(agent): State<Arc<PeerAgent>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let data = agent.serve(&filename).await?;
    debug!("Serving {} ({} bytes)", filename, data.len());

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename.replace('"', "")))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, data).into_response())
}

/// Serve the agent's shared folder on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, agent: Arc<PeerAgent>, shutdown: F) -> Result<(), ShareError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("File server listening on {} (advertised as {})", local_addr, agent.address());

    axum::serve(listener, router(agent))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            error!("File server failed: {}", e);
            ShareError::network_unavailable_full("File server failed", local_addr.to_string(), e.to_string())
        })
}
