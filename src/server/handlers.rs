//! Orchestrator request handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::debug;

use crate::error::ShareError;
use crate::protocol::{
    DisconnectRequest, DisconnectResponse, FileListing, HandshakeRequest, HandshakeResponse,
    HealthResponse, PeerTable,
};
use crate::registry::{PeerAddress, Registry};
use crate::server::api::ApiError;

/// `POST /handshake`
///
/// The body is decoded by hand so that malformed JSON is answered with the
/// same 400 `{error}` shape as a missing field.
pub async fn handshake(
    State(registry): State<Arc<Registry>>,
    body: Bytes,
) -> Result<Json<HandshakeResponse>, ApiError> {
    let request: HandshakeRequest = serde_json::from_slice(&body).map_err(ShareError::from)?;
    debug!("Handshake from {} at {}:{}", request.peer_id, request.ip, request.port);

    let address = PeerAddress::new(request.ip, request.port);
    let peer_count = registry.handshake(&request.peer_id, address, request.files).await?;
    Ok(Json(HandshakeResponse::registered(peer_count)))
}

/// `GET /list`
pub async fn list(State(registry): State<Arc<Registry>>) -> Json<FileListing> {
    Json(registry.list().await)
}

/// `GET /peers`
pub async fn peers(State(registry): State<Arc<Registry>>) -> Json<PeerTable> {
    Json(registry.peers().await)
}

/// `POST /disconnect`
pub async fn disconnect(
    State(registry): State<Arc<Registry>>,
    body: Bytes,
) -> Result<Json<DisconnectResponse>, ApiError> {
    let request: DisconnectRequest = serde_json::from_slice(&body).map_err(ShareError::from)?;
    registry.disconnect(&request.peer_id).await?;
    Ok(Json(DisconnectResponse::disconnected()))
}

/// `GET /health`
pub async fn health(State(registry): State<Arc<Registry>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        peer_count: registry.peer_count().await,
    })
}
