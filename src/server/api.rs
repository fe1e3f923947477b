//! HTTP error responses
//!
//! Maps [`ShareError`] onto status codes and a `{"error": message}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt::{self, Display, Formatter};

use crate::error::ShareError;
use crate::protocol::ErrorBody;

/// Error returned by HTTP handlers
#[derive(Debug)]
pub struct ApiError {
    pub status_code: StatusCode,
    pub message: String,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message };
        (self.status_code, Json(body)).into_response()
    }
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        let status_code = match &err {
            ShareError::InvalidRequest { .. } | ShareError::UnknownPeer { .. } => StatusCode::BAD_REQUEST,
            ShareError::FileNotFound { .. } => StatusCode::NOT_FOUND,
            ShareError::TransferFailed { .. } => StatusCode::BAD_GATEWAY,
            ShareError::NetworkUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ShareError::StorageError { .. } | ShareError::ConfigError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match err {
            ShareError::InvalidRequest { message, .. } => message,
            ShareError::UnknownPeer { peer_id } => format!("unknown peer_id: {}", peer_id),
            ShareError::FileNotFound { filename, .. } => format!("file not found: {}", filename),
            other => other.to_string(),
        };
        Self { status_code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ShareError::invalid_request("peer_id, ip, and port required")).status_code,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ShareError::unknown_peer("x")).status_code, StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(ShareError::file_not_found("x")).status_code, StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ShareError::storage_error("disk full")).status_code,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_file_not_found_hides_local_path() {
        let err = ApiError::from(ShareError::file_not_found_in("doc.txt", "/home/user/shared"));
        assert_eq!(err.message, "file not found: doc.txt");
    }
}
