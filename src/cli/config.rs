//! CLI configuration module
//!
//! Turns parsed arguments into validated orchestrator and client settings.

use crate::cli::args::{ClientArgs, OrchestratorArgs};
use crate::discovery::SelectionPolicy;
use crate::registry::PeerAddress;
use crate::storage::ShareFolder;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration for the orchestrator process
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Bind address
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Liveness window, if expiry is enabled
    pub peer_ttl: Option<Duration>,
    /// Interval between stale peer sweeps
    pub prune_interval: Duration,
}

impl OrchestratorConfig {
    /// Create configuration from CLI arguments
    pub fn from_args(args: &OrchestratorArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            peer_ttl: (args.peer_ttl > 0).then(|| Duration::from_secs(args.peer_ttl)),
            prune_interval: Duration::from_secs(args.prune_interval),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow::anyhow!("host cannot be empty"));
        }
        if self.peer_ttl.is_some() && self.prune_interval.is_zero() {
            return Err(anyhow::anyhow!("prune_interval must be at least 1 second when peer_ttl is set"));
        }
        Ok(())
    }

    /// Get the listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for a client (peer) process
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Orchestrator base URL
    pub orchestrator_url: Url,
    /// Advertised host
    pub host: String,
    /// File server port
    pub port: u16,
    /// File server bind address
    pub bind: String,
    /// Shared folder
    pub share_folder: PathBuf,
    /// Download folder
    pub download_folder: PathBuf,
    /// HTTP timeout
    pub timeout: Duration,
    /// Peer selection policy
    pub selection: SelectionPolicy,
}

impl ClientConfig {
    /// Create configuration from CLI arguments
    pub fn from_args(args: &ClientArgs) -> Result<Self> {
        let orchestrator_url = Url::parse(&args.orch)
            .with_context(|| format!("Invalid orchestrator URL: {}", args.orch))?;
        let selection: SelectionPolicy = args.selection.parse()?;

        Ok(Self {
            orchestrator_url,
            host: args.host.clone(),
            port: args.port,
            bind: args.bind.clone(),
            share_folder: args.share_folder.clone(),
            download_folder: args.download_folder.clone(),
            timeout: Duration::from_secs(args.timeout),
            selection,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.orchestrator_url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("orchestrator URL must use http or https"));
        }
        if self.port == 0 {
            return Err(anyhow::anyhow!("Port cannot be 0"));
        }
        if self.host.trim().is_empty() {
            return Err(anyhow::anyhow!("host cannot be empty"));
        }
        if self.timeout.is_zero() {
            return Err(anyhow::anyhow!("timeout must be at least 1 second"));
        }
        if self.share_folder.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("share_folder cannot be empty"));
        }
        if self.download_folder.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("download_folder cannot be empty"));
        }
        Ok(())
    }

    /// Address other peers are told to use
    pub fn advertised_address(&self) -> PeerAddress {
        PeerAddress::new(self.host.clone(), self.port)
    }

    /// Get the file server bind address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Create both folders if absent and open them
    pub async fn prepare_folders(&self) -> Result<(ShareFolder, ShareFolder)> {
        let shared = ShareFolder::open(&self.share_folder)
            .await
            .context("Failed to prepare share folder")?;
        let downloads = ShareFolder::open(&self.download_folder)
            .await
            .context("Failed to prepare download folder")?;
        Ok((shared, downloads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn client_args() -> ClientArgs {
        ClientArgs {
            orch: "http://localhost:5000".to_string(),
            host: "127.0.0.1".to_string(),
            port: 6000,
            bind: "0.0.0.0".to_string(),
            share_folder: PathBuf::from("shared"),
            download_folder: PathBuf::from("downloads"),
            timeout: 30,
            selection: "first".to_string(),
        }
    }

    #[test]
    fn test_orchestrator_config_from_args() {
        let args = OrchestratorArgs {
            host: "0.0.0.0".to_string(),
            port: 5000,
            peer_ttl: 0,
            prune_interval: 30,
        };
        let config = OrchestratorConfig::from_args(&args);
        assert!(config.peer_ttl.is_none());
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert!(config.validate().is_ok());

        let config = OrchestratorConfig::from_args(&OrchestratorArgs { peer_ttl: 90, ..args });
        assert_eq!(config.peer_ttl, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_orchestrator_config_invalid_port() {
        let config = OrchestratorConfig {
            host: "0.0.0.0".to_string(),
            port: 0,
            peer_ttl: None,
            prune_interval: Duration::from_secs(30),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_from_args() {
        let config = ClientConfig::from_args(&client_args()).unwrap();
        assert_eq!(config.orchestrator_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.advertised_address(), PeerAddress::new("127.0.0.1", 6000));
        assert_eq!(config.listen_addr(), "0.0.0.0:6000");
        assert_eq!(config.selection, SelectionPolicy::First);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_rejects_bad_input() {
        let mut args = client_args();
        args.orch = "not a url".to_string();
        assert!(ClientConfig::from_args(&args).is_err());

        let mut args = client_args();
        args.selection = "fastest".to_string();
        assert!(ClientConfig::from_args(&args).is_err());

        let mut args = client_args();
        args.orch = "ftp://localhost:5000".to_string();
        assert!(ClientConfig::from_args(&args).unwrap().validate().is_err());

        let mut args = client_args();
        args.timeout = 0;
        assert!(ClientConfig::from_args(&args).unwrap().validate().is_err());
    }

    #[tokio::test]
    async fn test_prepare_folders_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let mut args = client_args();
        args.share_folder = tmp.path().join("a").join("shared");
        args.download_folder = tmp.path().join("b").join("downloads");
        let config = ClientConfig::from_args(&args).unwrap();

        let (shared, downloads) = config.prepare_folders().await.unwrap();

        assert!(shared.root().is_dir());
        assert!(downloads.root().is_dir());
        assert!(!shared.same_root(&downloads));
    }
}
