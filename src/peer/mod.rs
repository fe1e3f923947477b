//! Peer module
//!
//! The local peer's identity, announcements and file server.

pub mod agent;
pub mod server;

// Re-export main types
pub use agent::{generate_peer_id, PeerAgent};
