//! Error types for the catalog client.

use levelplay_core::LevelError;
use thiserror::Error;

/// Errors that can occur when talking to the catalog gateway.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The gateway rejected the configured token, or none is configured
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid gateway URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// No stream locator for this track
    #[error("Stream unavailable for track {track_id}: {reason}")]
    StreamUnavailable { track_id: String, reason: String },
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl From<CatalogError> for LevelError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::StreamUnavailable { track_id, reason } => {
                LevelError::StreamUnavailable { track_id, reason }
            }
            other => LevelError::Catalog(other.to_string()),
        }
    }
}
