//! Registry service
//!
//! Owns the peer table and file index and exposes the four orchestrator
//! operations. All mutation goes through one write lock so that a reader
//! only ever sees the state before or after a handshake/disconnect.

use crate::error::ShareError;
use crate::protocol::{FileListing, PeerTable};
use crate::registry::model::{PeerAddress, PeerRecord, RegistryState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The orchestrator's peer registry
#[derive(Debug, Default)]
pub struct Registry {
    /// Peer table and file index
    state: RwLock<RegistryState>,
    /// Optional liveness window; `None` keeps peers until they disconnect
    peer_ttl: Option<Duration>,
}

impl Registry {
    /// Create an empty registry without liveness expiry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that expires peers silent for longer than `ttl`
    pub fn with_peer_ttl(ttl: Duration) -> Self {
        Self {
            state: RwLock::new(RegistryState::new()),
            peer_ttl: Some(ttl),
        }
    }

    /// Configured liveness window
    pub fn peer_ttl(&self) -> Option<Duration> {
        self.peer_ttl
    }

    /// Register or re-register a peer.
    ///
    /// The previous record (if any) is replaced wholesale: its files are
    /// removed from the index before the new ones are inserted. Returns the
    /// number of registered peers.
    pub async fn handshake(&self, peer_id: &str, address: PeerAddress, files: Vec<String>) -> Result<usize, ShareError> {
        validate_handshake(peer_id, &address)?;

        let record = PeerRecord::new(peer_id, address, files);
        let file_count = record.shared_files.len();
        let address_label = record.address.to_string();

        let peer_count = {
            let mut state = self.state.write().await;
            let known = state.peer(peer_id).is_some();
            let count = state.upsert(record);
            if known {
                debug!("Re-announced peer {} at {} ({} files)", peer_id, address_label, file_count);
            } else {
                info!(
                    "Registered peer {} at {} ({} files, total peers: {}, indexed files: {})",
                    peer_id,
                    address_label,
                    file_count,
                    count,
                    state.index().len()
                );
            }
            count
        };

        Ok(peer_count)
    }

    /// Every indexed filename with the peers sharing it
    pub async fn list(&self) -> FileListing {
        let state = self.state.read().await;
        let listing = state.listing();
        debug!("Listing {} files across {} peers", listing.len(), state.peer_count());
        listing
    }

    /// The full peer table
    pub async fn peers(&self) -> PeerTable {
        self.state.read().await.peer_table()
    }

    /// Remove a registered peer and all of its index entries
    pub async fn disconnect(&self, peer_id: &str) -> Result<(), ShareError> {
        let mut state = self.state.write().await;
        match state.remove(peer_id) {
            Some(record) => {
                info!(
                    "Disconnected peer {} at {} (remaining: {})",
                    peer_id,
                    record.address,
                    state.peer_count()
                );
                Ok(())
            }
            None => {
                warn!("Disconnect requested for unknown peer: {}", peer_id);
                Err(ShareError::unknown_peer(peer_id))
            }
        }
    }

    /// Remove peers whose last handshake is older than the configured TTL.
    ///
    /// Returns the ids removed; always empty when no TTL is configured.
    pub async fn prune_expired(&self, now: Instant) -> Vec<String> {
        let Some(ttl) = self.peer_ttl else {
            return Vec::new();
        };

        let mut state = self.state.write().await;
        let expired = state.expired(now, ttl);
        for peer_id in &expired {
            state.remove(peer_id);
            info!("Expired peer {} (no handshake for over {:?})", peer_id, ttl);
        }
        expired
    }

    /// Number of registered peers
    pub async fn peer_count(&self) -> usize {
        self.state.read().await.peer_count()
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> RegistryState {
        self.state.read().await.clone()
    }

    /// Run the liveness prune loop until the task is dropped
    pub async fn run_prune_loop(self: Arc<Self>, interval_secs: u64) {
        let Some(ttl) = self.peer_ttl else {
            debug!("No peer TTL configured, prune loop not started");
            return;
        };
        info!("Starting peer prune loop (ttl: {:?}, interval: {}s)", ttl, interval_secs);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

        loop {
            interval.tick().await;
            let removed = self.prune_expired(Instant::now()).await;
            if !removed.is_empty() {
                info!("Pruned {} stale peers", removed.len());
            }
        }
    }
}

fn validate_handshake(peer_id: &str, address: &PeerAddress) -> Result<(), ShareError> {
    let missing = if peer_id.trim().is_empty() {
        Some("peer_id")
    } else if address.host.trim().is_empty() {
        Some("ip")
    } else if address.port == 0 {
        Some("port")
    } else {
        None
    };

    match missing {
        Some(field) => {
            warn!("Rejected handshake: missing {}", field);
            Err(ShareError::invalid_request_with_field("peer_id, ip, and port required", field))
        }
        None => Ok(()),
    }
}
