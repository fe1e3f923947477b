//! Registry data model
//!
//! The forward peer table and the inverted file index held by the
//! orchestrator. Mutation is crate-private: only [`Registry`] changes
//! these structures, always both of them under one lock.
//!
//! [`Registry`]: crate::registry::Registry

use crate::protocol::{FileListing, PeerLocation, PeerSummary, PeerTable};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::trace;

/// Where a peer's file server can be reached
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub host: String,
    pub port: u16,
}

impl PeerAddress {
    /// Create a new peer address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A registered peer as of its last handshake
#[derive(Debug, Clone)]
pub struct PeerRecord {
    /// Client-generated identifier
    pub peer_id: String,
    /// File server address
    pub address: PeerAddress,
    /// Filenames currently offered
    pub shared_files: BTreeSet<String>,
    /// Time of the last handshake
    pub last_seen: Instant,
}

impl PeerRecord {
    /// Create a new record; duplicate names collapse and empty names are dropped
    pub fn new(peer_id: impl Into<String>, address: PeerAddress, files: impl IntoIterator<Item = String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            address,
            shared_files: files.into_iter().filter(|f| !f.is_empty()).collect(),
            last_seen: Instant::now(),
        }
    }

    /// Wire entry for `GET /list`
    pub fn location(&self) -> PeerLocation {
        PeerLocation {
            peer_id: self.peer_id.clone(),
            ip: self.address.host.clone(),
            port: self.address.port,
        }
    }

    /// Wire entry for `GET /peers`
    pub fn summary(&self) -> PeerSummary {
        PeerSummary {
            ip: self.address.host.clone(),
            port: self.address.port,
            files: self.shared_files.iter().cloned().collect(),
        }
    }

    /// Whether the last handshake is older than `ttl` at `now`
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > ttl
    }
}

/// Inverted mapping from filename to the ids of the peers sharing it
///
/// An entry is never empty.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl FileIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, filename: &str, peer_id: &str) {
        self.entries
            .entry(filename.to_string())
            .or_default()
            .insert(peer_id.to_string());
    }

    /// Remove one association, dropping the entry once it is empty
    pub(crate) fn remove(&mut self, filename: &str, peer_id: &str) -> bool {
        let Some(sharers) = self.entries.get_mut(filename) else {
            return false;
        };
        let removed = sharers.remove(peer_id);
        if sharers.is_empty() {
            trace!("Dropping empty index entry: {}", filename);
            self.entries.remove(filename);
        }
        removed
    }

    /// Peers sharing `filename`, ordered by peer id
    pub fn sharers(&self, filename: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(filename)
    }

    /// Whether `peer_id` is indexed under `filename`
    pub fn contains(&self, filename: &str, peer_id: &str) -> bool {
        self.entries
            .get(filename)
            .map_or(false, |sharers| sharers.contains(peer_id))
    }

    /// Iterate over entries in filename order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    /// Number of distinct filenames
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Peer table and file index, always updated together
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    peers: HashMap<String, PeerRecord>,
    index: FileIndex,
}

impl RegistryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or create) a peer's record and re-index its files.
    /// Returns the number of registered peers afterwards.
    pub(crate) fn upsert(&mut self, record: PeerRecord) -> usize {
        if let Some(old) = self.peers.remove(&record.peer_id) {
            for filename in &old.shared_files {
                self.index.remove(filename, &old.peer_id);
            }
        }
        for filename in &record.shared_files {
            self.index.insert(filename, &record.peer_id);
        }
        self.peers.insert(record.peer_id.clone(), record);
        self.peers.len()
    }

    /// Remove a peer and every index association it has
    pub(crate) fn remove(&mut self, peer_id: &str) -> Option<PeerRecord> {
        let record = self.peers.remove(peer_id)?;
        for filename in &record.shared_files {
            self.index.remove(filename, peer_id);
        }
        Some(record)
    }

    /// Look up a peer by id
    pub fn peer(&self, peer_id: &str) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    /// Iterate over all registered peers
    pub fn peers(&self) -> impl Iterator<Item = &PeerRecord> {
        self.peers.values()
    }

    pub fn index(&self) -> &FileIndex {
        &self.index
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Ids of peers whose last handshake is older than `ttl`
    pub fn expired(&self, now: Instant, ttl: Duration) -> Vec<String> {
        let mut ids: Vec<String> = self
            .peers
            .values()
            .filter(|p| p.is_expired(now, ttl))
            .map(|p| p.peer_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Build the `GET /list` view
    pub fn listing(&self) -> FileListing {
        self.index
            .iter()
            .map(|(filename, sharers)| {
                let locations = sharers
                    .iter()
                    .filter_map(|pid| self.peers.get(pid))
                    .map(PeerRecord::location)
                    .collect();
                (filename.clone(), locations)
            })
            .collect()
    }

    /// Build the `GET /peers` view
    pub fn peer_table(&self) -> PeerTable {
        self.peers
            .iter()
            .map(|(pid, record)| (pid.clone(), record.summary()))
            .collect()
    }

    /// Verify that the peer table and the index agree.
    ///
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        for record in self.peers.values() {
            for filename in &record.shared_files {
                if !self.index.contains(filename, &record.peer_id) {
                    return Err(format!("{} shares {} but is not indexed under it", record.peer_id, filename));
                }
            }
        }
        for (filename, sharers) in self.index.iter() {
            if sharers.is_empty() {
                return Err(format!("index entry {} is empty", filename));
            }
            for pid in sharers {
                match self.peers.get(pid) {
                    None => return Err(format!("index entry {} references unknown peer {}", filename, pid)),
                    Some(record) if !record.shared_files.contains(filename) => {
                        return Err(format!("index entry {} references {} which does not share it", filename, pid))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}
