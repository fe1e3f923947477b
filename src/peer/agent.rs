//! Peer agent module
//!
//! Owns this process's identity and shared folder, announces the folder's
//! contents to the orchestrator and serves its files to other peers.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::discovery::Directory;
use crate::error::ShareError;
use crate::protocol::HandshakeRequest;
use crate::registry::PeerAddress;
use crate::storage::ShareFolder;

/// Generate a random peer ID (16 random bytes, hex encoded)
pub fn generate_peer_id() -> String {
    let peer_id = hex::encode(rand::random::<[u8; 16]>());
    info!("Generated new peer ID: {}", peer_id);
    peer_id
}

/// The local peer: identity, advertised address and shared folder
pub struct PeerAgent {
    /// Our peer ID, stable for the process lifetime
    peer_id: String,
    /// Address other peers use to reach our file server
    address: PeerAddress,
    /// Folder whose files we offer
    shared: ShareFolder,
    /// Orchestrator access
    directory: Arc<dyn Directory>,
}

impl PeerAgent {
    /// Create a new peer agent
    pub fn new(
        peer_id: impl Into<String>,
        address: PeerAddress,
        shared: ShareFolder,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            address,
            shared,
            directory,
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn address(&self) -> &PeerAddress {
        &self.address
    }

    pub fn shared_folder(&self) -> &ShareFolder {
        &self.shared
    }

    /// Scan the shared folder and handshake with its current contents.
    ///
    /// Returns the number of peers the orchestrator reports.
    pub async fn announce(&self) -> Result<usize, ShareError> {
        let files = self.shared.list_files().await?;
        debug!("Announcing {} files as {}", files.len(), self.peer_id);

        let request = HandshakeRequest::new(
            self.peer_id.clone(),
            self.address.host.clone(),
            self.address.port,
            files,
        );
        let ack = self.directory.handshake(&request).await?;
        info!(
            "Announced {} files at {} ({} peers online)",
            request.files.len(),
            self.address,
            ack.peer_count
        );
        Ok(ack.peer_count)
    }

    /// Contents of `filename` from the shared folder
    pub async fn serve(&self, filename: &str) -> Result<Bytes, ShareError> {
        self.shared.read(filename).await
    }

    /// Disconnect from the orchestrator. Failures are logged, not returned.
    pub async fn withdraw(&self) -> bool {
        match self.directory.disconnect(&self.peer_id).await {
            Ok(_) => {
                info!("Disconnected from orchestrator");
                true
            }
            Err(e) => {
                warn!("Failed to disconnect {}: {}", self.peer_id, e);
                false
            }
        }
    }
}
