//! Interactive client shell
//!
//! A line-oriented command loop over the discovery client and peer agent.

use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::cli::display::{format_fetch, format_listing, format_peers};
use crate::discovery::{Directory, Discovery};
use crate::error::ShareError;
use crate::peer::PeerAgent;

const HELP: &str = "Commands: list, peers, download <filename>, announce, help, exit";

/// A parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Peers,
    Download(String),
    Announce,
    Help,
    Exit,
    Empty,
    Unknown(String),
}

impl ShellCommand {
    /// Parse one input line. The file name is the rest of the line, so it may contain spaces.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };
        match (cmd, rest) {
            ("", _) => ShellCommand::Empty,
            ("list" | "ls", "") => ShellCommand::List,
            ("peers", "") => ShellCommand::Peers,
            ("download" | "get", name) if !name.is_empty() => ShellCommand::Download(name.to_string()),
            ("announce" | "refresh", "") => ShellCommand::Announce,
            ("help" | "?", _) => ShellCommand::Help,
            ("exit" | "quit", "") => ShellCommand::Exit,
            _ => ShellCommand::Unknown(line.to_string()),
        }
    }
}

/// What the shell should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutput {
    Print(String),
    Exit,
}

/// Interactive shell state
pub struct Shell {
    directory: Arc<dyn Directory>,
    agent: Arc<PeerAgent>,
    discovery: Discovery,
}

impl Shell {
    pub fn new(directory: Arc<dyn Directory>, agent: Arc<PeerAgent>, discovery: Discovery) -> Self {
        Self {
            directory,
            agent,
            discovery,
        }
    }

    /// Run one command
    pub async fn execute(&self, command: ShellCommand) -> Result<ShellOutput, ShareError> {
        debug!("Executing shell command: {:?}", command);
        let text = match command {
            ShellCommand::List => format_listing(&self.directory.list().await?),
            ShellCommand::Peers => format_peers(&self.directory.peers().await?),
            ShellCommand::Download(filename) => {
                let outcome = self.discovery.fetch(&filename).await?;
                format_fetch(&filename, &outcome)
            }
            ShellCommand::Announce => {
                let peer_count = self.agent.announce().await?;
                format!("Announced shared folder ({} peers online)", peer_count)
            }
            ShellCommand::Help | ShellCommand::Unknown(_) => HELP.to_string(),
            ShellCommand::Empty => String::new(),
            ShellCommand::Exit => return Ok(ShellOutput::Exit),
        };
        Ok(ShellOutput::Print(text))
    }

    /// Read commands from `input` until `exit` or end of input
    pub async fn run<R>(&self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match self.execute(ShellCommand::parse(&line)).await {
                Ok(ShellOutput::Exit) => break,
                Ok(ShellOutput::Print(text)) if text.is_empty() => {}
                Ok(ShellOutput::Print(text)) => println!("{}", text),
                Err(e) => {
                    warn!("Command failed: {}", e);
                    println!("Error: {}", e);
                }
            }
        }

        println!("Exiting...");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SelectionPolicy;
    use crate::registry::{PeerAddress, Registry};
    use crate::storage::ShareFolder;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("list"), ShellCommand::List);
        assert_eq!(ShellCommand::parse("  peers  "), ShellCommand::Peers);
        assert_eq!(ShellCommand::parse("download doc.txt"), ShellCommand::Download("doc.txt".to_string()));
        assert_eq!(ShellCommand::parse("get my file.txt"), ShellCommand::Download("my file.txt".to_string()));
        assert_eq!(ShellCommand::parse("announce"), ShellCommand::Announce);
        assert_eq!(ShellCommand::parse("quit"), ShellCommand::Exit);
        assert_eq!(ShellCommand::parse(""), ShellCommand::Empty);
        assert_eq!(ShellCommand::parse("download"), ShellCommand::Unknown("download".to_string()));
        assert_eq!(ShellCommand::parse("rm -rf"), ShellCommand::Unknown("rm -rf".to_string()));
    }

    async fn shell() -> (TempDir, Arc<Registry>, Shell) {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("shared")).unwrap();
        std::fs::write(tmp.path().join("shared").join("doc.txt"), b"doc").unwrap();
        let registry = Arc::new(Registry::new());
        let shared = ShareFolder::open(tmp.path().join("shared")).await.unwrap();
        let downloads = ShareFolder::open(tmp.path().join("downloads")).await.unwrap();
        let agent = Arc::new(PeerAgent::new("me", PeerAddress::new("127.0.0.1", 6000), shared, registry.clone()));
        let discovery = Discovery::new(
            registry.clone(),
            agent.clone(),
            downloads,
            Duration::from_secs(5),
            SelectionPolicy::First,
        )
        .unwrap();
        (tmp, registry.clone(), Shell::new(registry, agent, discovery))
    }

    #[tokio::test]
    async fn test_execute_announce_then_list() {
        let (_tmp, _registry, shell) = shell().await;

        let out = shell.execute(ShellCommand::Announce).await.unwrap();
        assert_eq!(out, ShellOutput::Print("Announced shared folder (1 peers online)".to_string()));

        match shell.execute(ShellCommand::List).await.unwrap() {
            ShellOutput::Print(text) => assert!(text.starts_with("doc.txt: 1 peer")),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_download_missing_file() {
        let (_tmp, _registry, shell) = shell().await;

        let err = shell.execute(ShellCommand::Download("missing.txt".to_string())).await.unwrap_err();
        assert!(matches!(err, ShareError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_execute_exit_and_help() {
        let (_tmp, _registry, shell) = shell().await;

        assert_eq!(shell.execute(ShellCommand::Exit).await.unwrap(), ShellOutput::Exit);
        assert_eq!(shell.execute(ShellCommand::Help).await.unwrap(), ShellOutput::Print(HELP.to_string()));
    }

    #[tokio::test]
    async fn test_run_stops_at_exit() {
        let (_tmp, registry, shell) = shell().await;
        let input: &[u8] = b"announce\nexit\nannounce\n";

        shell.run(input).await.unwrap();

        assert_eq!(registry.peer_count().await, 1);
    }
}
