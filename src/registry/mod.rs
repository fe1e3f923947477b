//! Orchestrator registry module
//!
//! Tracks which peers are online and which files each one shares.

pub mod model;
pub mod service;

// Re-export main types
pub use model::{FileIndex, PeerAddress, PeerRecord, RegistryState};
pub use service::Registry;
