//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the file sharing overlay
#[derive(Debug, Parser)]
#[command(name = "p2p-file-share")]
#[command(about = "Peer-to-peer file sharing with a central orchestrator", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Process role
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the orchestrator (peer and file registry)
    Orchestrator(OrchestratorArgs),
    /// Run a peer: share a folder and download from other peers
    Client(ClientArgs),
}

/// Orchestrator arguments
#[derive(Debug, Clone, Args)]
pub struct OrchestratorArgs {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    /// Drop peers that have not handshaked for this many seconds (0 = never)
    #[arg(long, default_value_t = 0)]
    pub peer_ttl: u64,

    /// Seconds between stale peer sweeps when a TTL is set
    #[arg(long, default_value_t = 30)]
    pub prune_interval: u64,
}

/// Client arguments
#[derive(Debug, Clone, Args)]
pub struct ClientArgs {
    /// Orchestrator URL, e.g. http://localhost:5000
    #[arg(long, value_name = "URL")]
    pub orch: String,

    /// Host other peers use to reach this client
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port of this client's file server
    #[arg(short, long, default_value_t = 6000)]
    pub port: u16,

    /// Local address the file server binds to
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Folder to share
    #[arg(long, value_name = "DIR")]
    pub share_folder: PathBuf,

    /// Folder to save downloads into
    #[arg(long, value_name = "DIR")]
    pub download_folder: PathBuf,

    /// HTTP timeout in seconds for orchestrator calls and transfers
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Peer selection when several peers share a file (first or random)
    #[arg(long, default_value = "first")]
    pub selection: String,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_defaults() {
        let args = CliArgs::parse_from(["p2p-file-share", "orchestrator"]);
        match &args.command {
            Command::Orchestrator(o) => {
                assert_eq!(o.host, "0.0.0.0");
                assert_eq!(o.port, 5000);
                assert_eq!(o.peer_ttl, 0);
                assert_eq!(o.prune_interval, 30);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_client_args() {
        let args = CliArgs::parse_from([
            "p2p-file-share",
            "client",
            "--orch",
            "http://localhost:5000",
            "--port",
            "6001",
            "--share-folder",
            "shared",
            "--download-folder",
            "downloads",
            "-v",
        ]);
        assert!(args.is_verbose());
        assert!(!args.is_quiet());
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
        match args.command {
            Command::Client(c) => {
                assert_eq!(c.orch, "http://localhost:5000");
                assert_eq!(c.host, "127.0.0.1");
                assert_eq!(c.port, 6001);
                assert_eq!(c.share_folder, PathBuf::from("shared"));
                assert_eq!(c.download_folder, PathBuf::from("downloads"));
                assert_eq!(c.timeout, 30);
                assert_eq!(c.selection, "first");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_client_requires_folders() {
        let result = CliArgs::try_parse_from(["p2p-file-share", "client", "--orch", "http://localhost:5000"]);
        assert!(result.is_err());
    }
}
