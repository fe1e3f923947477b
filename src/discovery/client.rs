//! Discovery client module
//!
//! Finds a peer sharing a file through the orchestrator, downloads it
//! directly from that peer, publishes it from our shared folder and
//! re-announces.

use rand::seq::SliceRandom;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::discovery::Directory;
use crate::error::ShareError;
use crate::peer::PeerAgent;
use crate::protocol::PeerLocation;
use crate::storage::{is_safe_filename, ShareFolder};

/// How to choose among several peers sharing the same file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Lowest peer id; the registry lists sharers in that order
    #[default]
    First,
    /// Uniformly random sharer
    Random,
}

impl SelectionPolicy {
    /// Pick one candidate, or `None` if there are none
    pub fn select<'a>(&self, candidates: &'a [PeerLocation]) -> Option<&'a PeerLocation> {
        match self {
            SelectionPolicy::First => candidates.iter().min_by(|a, b| a.peer_id.cmp(&b.peer_id)),
            SelectionPolicy::Random => candidates.choose(&mut rand::thread_rng()),
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = ShareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(SelectionPolicy::First),
            "random" => Ok(SelectionPolicy::Random),
            other => Err(ShareError::config_error_with_field(
                format!("unknown selection policy '{}' (expected first or random)", other),
                "selection",
            )),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::First => write!(f, "first"),
            SelectionPolicy::Random => write!(f, "random"),
        }
    }
}

/// Result of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Peer the file was downloaded from
    pub source: PeerLocation,
    /// Final location of the file on disk
    pub path: PathBuf,
    /// Number of bytes transferred
    pub bytes: usize,
}

/// Resolves files through the orchestrator and fetches them from peers
pub struct Discovery {
    /// Orchestrator access
    directory: Arc<dyn Directory>,
    /// Local agent, re-announced after every download
    agent: Arc<PeerAgent>,
    /// Where downloaded bytes land first
    downloads: ShareFolder,
    /// HTTP client for peer transfers
    http: reqwest::Client,
    /// Candidate selection
    policy: SelectionPolicy,
}

impl Discovery {
    /// Create a new discovery client with a per-transfer timeout
    pub fn new(
        directory: Arc<dyn Directory>,
        agent: Arc<PeerAgent>,
        downloads: ShareFolder,
        timeout: Duration,
        policy: SelectionPolicy,
    ) -> Result<Self, ShareError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShareError::config_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            directory,
            agent,
            downloads,
            http,
            policy,
        })
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    /// Pick a peer currently sharing `filename`.
    ///
    /// Our own entry is only chosen when no other peer shares the file.
    pub async fn resolve(&self, filename: &str) -> Result<PeerLocation, ShareError> {
        let listing = self.directory.list().await?;
        let Some(candidates) = listing.get(filename) else {
            info!("File {} not found in network", filename);
            return Err(ShareError::file_not_found(filename));
        };

        let others: Vec<PeerLocation> = candidates
            .iter()
            .filter(|c| c.peer_id != self.agent.peer_id())
            .cloned()
            .collect();
        let pool = if others.is_empty() { candidates.as_slice() } else { others.as_slice() };

        let chosen = self
            .policy
            .select(pool)
            .cloned()
            .ok_or_else(|| ShareError::file_not_found(filename))?;
        debug!(
            "Resolved {} to {} at {} ({} candidates, policy: {})",
            filename,
            chosen.peer_id,
            chosen.label(),
            candidates.len(),
            self.policy
        );
        Ok(chosen)
    }

    /// Download `filename` from a peer, publish it and re-announce
    pub async fn fetch(&self, filename: &str) -> Result<FetchOutcome, ShareError> {
        if !is_safe_filename(filename) {
            warn!("Refusing to fetch unsafe file name: {:?}", filename);
            return Err(ShareError::invalid_request_with_field(
                format!("'{}' is not a plain file name", filename),
                "filename",
            ));
        }

        let source = self.resolve(filename).await?;
        let url = source.download_url(filename);
        info!("Downloading {} from {}", filename, url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!("Peer {} answered {} for {}", source.label(), status, filename);
            return Err(ShareError::transfer_failed(filename, source.label(), Some(status.as_u16())));
        }
        let data = response.bytes().await.map_err(|e| {
            error!("Transfer of {} from {} interrupted: {}", filename, source.label(), e);
            ShareError::transfer_failed(filename, source.label(), None)
        })?;

        let saved = self.downloads.write(filename, &data).await?;
        info!("Saved {} ({} bytes) to {}", filename, data.len(), saved.display());

        let shared = self.agent.shared_folder();
        let path = if self.downloads.same_root(shared) {
            saved
        } else {
            self.downloads.move_into(filename, shared).await?
        };

        // The file is already on disk; a failed re-announce only delays publication.
        if let Err(e) = self.agent.announce().await {
            warn!("Downloaded {} but re-announce failed: {}", filename, e);
        }

        Ok(FetchOutcome {
            source,
            path,
            bytes: data.len(),
        })
    }
}
