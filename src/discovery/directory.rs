//! Directory abstraction
//!
//! The peer agent and discovery client talk to the orchestrator through the
//! [`Directory`] trait, so the same workflow runs against the HTTP
//! orchestrator or an in-process [`Registry`].

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::ShareError;
use crate::protocol::{
    DisconnectRequest, DisconnectResponse, ErrorBody, FileListing, HandshakeRequest,
    HandshakeResponse, PeerTable,
};
use crate::registry::{PeerAddress, Registry};

/// Access to the orchestrator's registry operations
#[async_trait]
pub trait Directory: Send + Sync {
    /// Register or re-announce a peer
    async fn handshake(&self, request: &HandshakeRequest) -> Result<HandshakeResponse, ShareError>;

    /// Every shared filename with its sharers
    async fn list(&self) -> Result<FileListing, ShareError>;

    /// The full peer table
    async fn peers(&self) -> Result<PeerTable, ShareError>;

    /// Remove a peer from the registry
    async fn disconnect(&self, peer_id: &str) -> Result<DisconnectResponse, ShareError>;
}

#[async_trait]
impl Directory for Registry {
    async fn handshake(&self, request: &HandshakeRequest) -> Result<HandshakeResponse, ShareError> {
        let address = PeerAddress::new(request.ip.clone(), request.port);
        let peer_count = Registry::handshake(self, &request.peer_id, address, request.files.clone()).await?;
        Ok(HandshakeResponse::registered(peer_count))
    }

    async fn list(&self) -> Result<FileListing, ShareError> {
        Ok(Registry::list(self).await)
    }

    async fn peers(&self) -> Result<PeerTable, ShareError> {
        Ok(Registry::peers(self).await)
    }

    async fn disconnect(&self, peer_id: &str) -> Result<DisconnectResponse, ShareError> {
        Registry::disconnect(self, peer_id).await?;
        Ok(DisconnectResponse::disconnected())
    }
}

/// HTTP client for a remote orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorClient {
    /// HTTP client
    http: reqwest::Client,
    /// Orchestrator base URL
    base_url: Url,
}

impl OrchestratorClient {
    /// Create a new orchestrator client with a per-request timeout
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ShareError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!("Failed to build HTTP client: {}", e);
                ShareError::config_error(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create an orchestrator client sharing an existing HTTP client
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Orchestrator base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ShareError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        }
    }

    fn unexpected_status(url: &Url, status: StatusCode, message: String) -> ShareError {
        error!("Orchestrator returned {} for {}: {}", status, url, message);
        ShareError::network_unavailable_full(
            format!("Orchestrator returned {}", status),
            url.to_string(),
            message,
        )
    }
}

#[async_trait]
impl Directory for OrchestratorClient {
    async fn handshake(&self, request: &HandshakeRequest) -> Result<HandshakeResponse, ShareError> {
        let url = self.endpoint("handshake")?;
        debug!("POST {} ({} files)", url, request.files.len());
        let response = self.http.post(url.clone()).json(request).send().await?;

        let status = response.status();
        if status.is_success() {
            let ack: HandshakeResponse = response.json().await?;
            info!("Handshake accepted ({} peers online)", ack.peer_count);
            return Ok(ack);
        }

        let message = Self::error_message(response).await;
        if status == StatusCode::BAD_REQUEST {
            warn!("Handshake rejected: {}", message);
            return Err(ShareError::invalid_request(message));
        }
        Err(Self::unexpected_status(&url, status, message))
    }

    async fn list(&self) -> Result<FileListing, ShareError> {
        let url = self.endpoint("list")?;
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(Self::unexpected_status(&url, status, message));
        }
        Ok(response.json().await?)
    }

    async fn peers(&self) -> Result<PeerTable, ShareError> {
        let url = self.endpoint("peers")?;
        debug!("GET {}", url);
        let response = self.http.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(Self::unexpected_status(&url, status, message));
        }
        Ok(response.json().await?)
    }

    async fn disconnect(&self, peer_id: &str) -> Result<DisconnectResponse, ShareError> {
        let url = self.endpoint("disconnect")?;
        debug!("POST {} (peer: {})", url, peer_id);
        let body = DisconnectRequest {
            peer_id: peer_id.to_string(),
        };
        let response = self.http.post(url.clone()).json(&body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = Self::error_message(response).await;
        if status == StatusCode::BAD_REQUEST {
            warn!("Disconnect rejected: {}", message);
            return Err(ShareError::unknown_peer(peer_id));
        }
        Err(Self::unexpected_status(&url, status, message))
    }
}
