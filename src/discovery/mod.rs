//! Discovery module
//!
//! Orchestrator access and the resolve-and-fetch workflow.

pub mod client;
pub mod directory;

// Re-export main types
pub use client::{Discovery, FetchOutcome, SelectionPolicy};
pub use directory::{Directory, OrchestratorClient};
