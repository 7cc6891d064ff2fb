/// Core error types for levelplay
use std::time::Duration;
use thiserror::Error;

/// Result type alias using `LevelError`
pub type Result<T> = std::result::Result<T, LevelError>;

/// Core error type for levelplay
#[derive(Error, Debug)]
pub enum LevelError {
    /// A device profile carries values the electrical model cannot use
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// A device name is not present in the device catalog
    #[error("Unknown {kind} device: {name}")]
    UnknownDevice {
        /// "source" or "sink"
        kind: String,
        /// Name that was looked up
        name: String,
    },

    /// A collection reference could not be parsed
    #[error("Invalid collection reference: {0}")]
    InvalidReference(String),

    /// The catalog could not hand out a stream locator for a track
    #[error("Stream unavailable for track {track_id}: {reason}")]
    StreamUnavailable {
        /// Catalog track identifier
        track_id: String,
        /// Why no locator was handed out
        reason: String,
    },

    /// The catalog collaborator failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// External tool binary could not be spawned
    #[error("{tool} is not available: {reason}")]
    ToolMissing {
        /// Tool display name
        tool: String,
        /// Spawn error
        reason: String,
    },

    /// External tool exited with a non-zero status
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Tool display name
        tool: String,
        /// Exit status as reported by the OS
        status: String,
        /// Tail of the tool's stderr
        stderr: String,
    },

    /// External tool did not finish in time
    #[error("{tool} timed out after {timeout:?}")]
    ToolTimeout {
        /// Tool display name
        tool: String,
        /// Limit that was exceeded
        timeout: Duration,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LevelError {
    /// Create an invalid profile error
    pub fn invalid_profile(msg: impl Into<String>) -> Self {
        Self::InvalidProfile(msg.into())
    }

    /// Create an unknown device error
    pub fn unknown_device(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownDevice {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a stream unavailable error
    pub fn stream_unavailable(track_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StreamUnavailable {
            track_id: track_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Whether this error came from an external tool (spawn, exit status or timeout)
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Self::ToolMissing { .. } | Self::ToolFailed { .. } | Self::ToolTimeout { .. }
        )
    }
}
