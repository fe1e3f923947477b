//! Display module
//!
//! Formats orchestrator listings and transfer results for the terminal.

use crate::discovery::FetchOutcome;
use crate::protocol::{FileListing, PeerTable};
use std::fmt::Write;

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Files in the network with their sharers
pub fn format_listing(listing: &FileListing) -> String {
    if listing.is_empty() {
        return "No files shared in the network".to_string();
    }
    let mut out = String::new();
    for (filename, peers) in listing {
        let _ = writeln!(out, "{}: {} peer{}", filename, peers.len(), if peers.len() == 1 { "" } else { "s" });
        for peer in peers {
            let _ = writeln!(out, "  - {} @ {}", peer.peer_id, peer.label());
        }
    }
    out.trim_end().to_string()
}

/// Registered peers with their files
pub fn format_peers(peers: &PeerTable) -> String {
    if peers.is_empty() {
        return "No peers registered".to_string();
    }
    let mut out = String::new();
    for (peer_id, summary) in peers {
        let _ = writeln!(out, "{} @ {}:{} ({} files)", peer_id, summary.ip, summary.port, summary.files.len());
        for file in &summary.files {
            let _ = writeln!(out, "  - {}", file);
        }
    }
    out.trim_end().to_string()
}

/// One-line summary of a completed download
pub fn format_fetch(filename: &str, outcome: &FetchOutcome) -> String {
    format!(
        "Downloaded {} ({}) from {} @ {}, saved to {}",
        filename,
        format_bytes(outcome.bytes as u64),
        outcome.source.peer_id,
        outcome.source.label(),
        outcome.path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{PeerLocation, PeerSummary};

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_format_listing() {
        let mut listing = FileListing::new();
        listing.insert(
            "doc.txt".to_string(),
            vec![PeerLocation {
                peer_id: "a".to_string(),
                ip: "127.0.0.1".to_string(),
                port: 6000,
            }],
        );
        assert_eq!(format_listing(&listing), "doc.txt: 1 peer\n  - a @ 127.0.0.1:6000");
        assert_eq!(format_listing(&FileListing::new()), "No files shared in the network");
    }

    #[test]
    fn test_format_peers() {
        let mut peers = PeerTable::new();
        peers.insert(
            "a".to_string(),
            PeerSummary {
                ip: "127.0.0.1".to_string(),
                port: 6000,
                files: vec!["doc.txt".to_string()],
            },
        );
        assert_eq!(format_peers(&peers), "a @ 127.0.0.1:6000 (1 files)\n  - doc.txt");
    }
}
