//! Error types for the file sharing overlay
//!
//! This module defines the error taxonomy shared by the orchestrator
//! registry, the peer agent and the discovery client.

use std::fmt;

/// Error type for registry, peer and discovery operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// Missing or invalid request fields
    InvalidRequest {
        message: String,
        field: Option<String>,
    },

    /// Operation on a peer id that is not registered
    UnknownPeer {
        peer_id: String,
    },

    /// File absent from the network index or from a peer's disk
    FileNotFound {
        filename: String,
        location: Option<String>,
    },

    /// A peer answered a transfer with a non-success status
    TransferFailed {
        filename: String,
        peer: String,
        status: Option<u16>,
    },

    /// Orchestrator or peer could not be reached
    NetworkUnavailable {
        message: String,
        address: Option<String>,
        source: Option<String>,
    },

    /// Local file I/O errors
    StorageError {
        message: String,
        path: Option<String>,
        source: Option<String>,
    },

    /// Configuration errors
    ConfigError {
        message: String,
        field: Option<String>,
    },
}

impl ShareError {
    /// Create a new InvalidRequest error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ShareError::InvalidRequest {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new InvalidRequest error naming the offending field
    pub fn invalid_request_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ShareError::InvalidRequest {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new UnknownPeer error
    pub fn unknown_peer(peer_id: impl Into<String>) -> Self {
        ShareError::UnknownPeer {
            peer_id: peer_id.into(),
        }
    }

    /// Create a new FileNotFound error for the network-wide index
    pub fn file_not_found(filename: impl Into<String>) -> Self {
        ShareError::FileNotFound {
            filename: filename.into(),
            location: None,
        }
    }

    /// Create a new FileNotFound error for a specific folder or peer
    pub fn file_not_found_in(filename: impl Into<String>, location: impl Into<String>) -> Self {
        ShareError::FileNotFound {
            filename: filename.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new TransferFailed error
    pub fn transfer_failed(filename: impl Into<String>, peer: impl Into<String>, status: Option<u16>) -> Self {
        ShareError::TransferFailed {
            filename: filename.into(),
            peer: peer.into(),
            status,
        }
    }

    /// Create a new NetworkUnavailable error
    pub fn network_unavailable(message: impl Into<String>) -> Self {
        ShareError::NetworkUnavailable {
            message: message.into(),
            address: None,
            source: None,
        }
    }

    /// Create a new NetworkUnavailable error with address and source
    pub fn network_unavailable_full(
        message: impl Into<String>,
        address: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        ShareError::NetworkUnavailable {
            message: message.into(),
            address: Some(address.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new StorageError
    pub fn storage_error(message: impl Into<String>) -> Self {
        ShareError::StorageError {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a new StorageError with path and source
    pub fn storage_error_full(message: impl Into<String>, path: impl Into<String>, source: impl Into<String>) -> Self {
        ShareError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new ConfigError
    pub fn config_error(message: impl Into<String>) -> Self {
        ShareError::ConfigError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new ConfigError with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        ShareError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error means the remote side was unreachable
    pub fn is_network(&self) -> bool {
        matches!(self, ShareError::NetworkUnavailable { .. })
    }
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareError::InvalidRequest { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Invalid request: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Invalid request: {}", message)
                }
            }
            ShareError::UnknownPeer { peer_id } => {
                write!(f, "Unknown peer: {}", peer_id)
            }
            ShareError::FileNotFound { filename, location } => {
                if let Some(loc) = location {
                    write!(f, "File not found: {} (in: {})", filename, loc)
                } else {
                    write!(f, "File not found in network: {}", filename)
                }
            }
            ShareError::TransferFailed { filename, peer, status } => {
                if let Some(code) = status {
                    write!(f, "Transfer failed: {} from {} (status: {})", filename, peer, code)
                } else {
                    write!(f, "Transfer failed: {} from {}", filename, peer)
                }
            }
            ShareError::NetworkUnavailable { message, address, source } => {
                match (address, source) {
                    (Some(a), Some(s)) => write!(f, "Network unavailable: {} (address: {}, source: {})", message, a, s),
                    (Some(a), None) => write!(f, "Network unavailable: {} (address: {})", message, a),
                    (None, Some(s)) => write!(f, "Network unavailable: {} (source: {})", message, s),
                    (None, None) => write!(f, "Network unavailable: {}", message),
                }
            }
            ShareError::StorageError { message, path, source } => {
                match (path, source) {
                    (Some(p), Some(s)) => write!(f, "Storage error: {} (path: {}, source: {})", message, p, s),
                    (Some(p), None) => write!(f, "Storage error: {} (path: {})", message, p),
                    (None, Some(s)) => write!(f, "Storage error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Storage error: {}", message),
                }
            }
            ShareError::ConfigError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for ShareError {}

impl From<std::io::Error> for ShareError {
    fn from(err: std::io::Error) -> Self {
        ShareError::storage_error_full(err.to_string(), "unknown".to_string(), err.kind().to_string())
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(err: serde_json::Error) -> Self {
        ShareError::invalid_request(format!("Malformed JSON body: {}", err))
    }
}

impl From<url::ParseError> for ShareError {
    fn from(err: url::ParseError) -> Self {
        ShareError::config_error(format!("Invalid URL: {}", err))
    }
}

impl From<reqwest::Error> for ShareError {
    fn from(err: reqwest::Error) -> Self {
        let address = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        if err.is_timeout() {
            ShareError::network_unavailable_full("Request timed out", address, err.to_string())
        } else if err.is_connect() {
            ShareError::network_unavailable_full("Connection refused", address, err.to_string())
        } else {
            ShareError::network_unavailable_full("HTTP request failed", address, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_with_field() {
        let err = ShareError::invalid_request_with_field("peer_id, ip, and port required", "port");
        assert!(err.to_string().contains("Invalid request"));
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_unknown_peer() {
        let err = ShareError::unknown_peer("abc123");
        assert_eq!(err.to_string(), "Unknown peer: abc123");
    }

    #[test]
    fn test_file_not_found_variants() {
        let err = ShareError::file_not_found("doc.txt");
        assert_eq!(err.to_string(), "File not found in network: doc.txt");

        let err = ShareError::file_not_found_in("doc.txt", "/srv/shared");
        assert!(err.to_string().contains("/srv/shared"));
    }

    #[test]
    fn test_transfer_failed_with_status() {
        let err = ShareError::transfer_failed("doc.txt", "10.0.0.2:6000", Some(404));
        assert!(err.to_string().contains("status: 404"));
        assert!(err.to_string().contains("10.0.0.2:6000"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ShareError = io_err.into();
        assert!(matches!(err, ShareError::StorageError { .. }));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ShareError = json_err.into();
        assert!(matches!(err, ShareError::InvalidRequest { .. }));
    }

    #[test]
    fn test_is_network() {
        assert!(ShareError::network_unavailable("down").is_network());
        assert!(!ShareError::unknown_peer("x").is_network());
    }
}
