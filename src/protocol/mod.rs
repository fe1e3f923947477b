//! Orchestrator protocol module
//!
//! Implements the HTTP/JSON contract between peers and the orchestrator.

pub mod messages;

// Re-export main types
pub use messages::{
    DisconnectRequest, DisconnectResponse, ErrorBody, FileListing, HandshakeRequest,
    HandshakeResponse, HealthResponse, PeerLocation, PeerSummary, PeerTable,
    STATUS_DISCONNECTED, STATUS_REGISTERED,
};
