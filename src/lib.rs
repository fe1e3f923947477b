//! p2p-file-share
//!
//! Peer-to-peer file sharing over HTTP with a central orchestrator that
//! tracks which peer shares which file.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod storage;
pub mod peer;
pub mod discovery;
pub mod server;
pub mod cli;

pub use error::ShareError;

pub use protocol::{
    DisconnectRequest, DisconnectResponse, ErrorBody, FileListing, HandshakeRequest,
    HandshakeResponse, HealthResponse, PeerLocation, PeerSummary, PeerTable,
};
pub use registry::{FileIndex, PeerAddress, PeerRecord, Registry, RegistryState};
pub use storage::{is_safe_filename, ShareFolder};
pub use peer::{generate_peer_id, PeerAgent};
pub use discovery::{Directory, Discovery, FetchOutcome, OrchestratorClient, SelectionPolicy};
pub use cli::{CliArgs, ClientConfig, OrchestratorConfig, Shell};
