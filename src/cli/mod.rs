//! CLI module
//!
//! Command-line interface for the orchestrator and client roles.

pub mod args;
pub mod config;
pub mod display;
pub mod shell;

pub use args::{CliArgs, ClientArgs, Command, OrchestratorArgs};
pub use config::{ClientConfig, OrchestratorConfig};
pub use display::{format_bytes, format_fetch, format_listing, format_peers};
pub use shell::{Shell, ShellCommand, ShellOutput};
