//! Mapping engine errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::VaultError;

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError(pub VaultError);

impl ApiError {
    /// HTTP status for the wrapped error
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            VaultError::InvalidKey => StatusCode::BAD_REQUEST,
            // Corruption is reported to clients as absence
            VaultError::NotFound | VaultError::DataCorrupted { .. } => StatusCode::NOT_FOUND,
            VaultError::StorageNotReady | VaultError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            VaultError::Compression(_)
            | VaultError::Io(_)
            | VaultError::Config(_)
            | VaultError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VaultError> for ApiError {
    fn from(e: VaultError) -> Self {
        ApiError(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError(VaultError::Server(format!("storage task failed: {e}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
        }

        let message = match &self.0 {
            VaultError::InvalidKey => "invalid object name".to_string(),
            VaultError::NotFound | VaultError::DataCorrupted { .. } => "object not found".to_string(),
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}
