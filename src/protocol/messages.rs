//! Orchestrator wire messages
//!
//! JSON bodies exchanged between peers and the orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status string returned by a successful handshake
pub const STATUS_REGISTERED: &str = "registered";

/// Status string returned by a successful disconnect
pub const STATUS_DISCONNECTED: &str = "disconnected";

/// Body of `POST /handshake`
///
/// Every field defaults when absent so that a request with missing fields
/// reaches registry validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    #[serde(default)]
    pub peer_id: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub files: Vec<String>,
}

impl HandshakeRequest {
    /// Create a new handshake request
    pub fn new(peer_id: impl Into<String>, ip: impl Into<String>, port: u16, files: Vec<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            ip: ip.into(),
            port,
            files,
        }
    }
}

/// Response of `POST /handshake`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeResponse {
    pub status: String,
    pub peer_count: usize,
}

impl HandshakeResponse {
    pub fn registered(peer_count: usize) -> Self {
        Self {
            status: STATUS_REGISTERED.to_string(),
            peer_count,
        }
    }
}

/// Body of `POST /disconnect`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectRequest {
    #[serde(default)]
    pub peer_id: String,
}

/// Response of `POST /disconnect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectResponse {
    pub status: String,
}

impl DisconnectResponse {
    pub fn disconnected() -> Self {
        Self {
            status: STATUS_DISCONNECTED.to_string(),
        }
    }
}

/// One sharer of a file, as listed by `GET /list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerLocation {
    pub peer_id: String,
    pub ip: String,
    pub port: u16,
}

impl PeerLocation {
    /// Base URL of the peer's file server
    pub fn base_url(&self) -> String {
        if self.ip.contains(':') && !self.ip.starts_with('[') {
            format!("http://[{}]:{}", self.ip, self.port)
        } else {
            format!("http://{}:{}", self.ip, self.port)
        }
    }

    /// URL of `filename` on the peer's file server, percent-encoded
    pub fn download_url(&self, filename: &str) -> String {
        format!("{}/download/{}", self.base_url(), urlencoding::encode(filename))
    }

    /// `ip:port` label used in logs and errors
    pub fn label(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// One entry of the peer table returned by `GET /peers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSummary {
    pub ip: String,
    pub port: u16,
    pub files: Vec<String>,
}

/// Response of `GET /list`: filename to its sharers
pub type FileListing = BTreeMap<String, Vec<PeerLocation>>;

/// Response of `GET /peers`: peer id to its record
pub type PeerTable = BTreeMap<String, PeerSummary>;

/// Body of every 4xx/5xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub peer_count: usize,
}
