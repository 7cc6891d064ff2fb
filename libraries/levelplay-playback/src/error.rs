//! Error types for track playback
//!
//! Every variant except `Catalog` and `Io` is recovered per track: the
//! orchestrator records the track as skipped and moves on.

use levelplay_loudness::LoudnessError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The catalog could not hand out a stream locator
    #[error("Stream unavailable for track {track_id}: {reason}")]
    StreamUnavailable {
        /// Catalog track identifier
        track_id: String,
        /// Catalog or transport error text
        reason: String,
    },

    /// Stream extraction failed, timed out or hit an unsupported codec
    #[error("Decode failed: {0}")]
    DecodeFailure(String),

    /// Headroom staging, rate conversion or the final gain re-encode failed
    #[error("Conversion failed: {0}")]
    ConversionFailure(String),

    /// No trustworthy loudness measurement
    #[error(transparent)]
    Measurement(#[from] LoudnessError),

    /// The hardware mixer rejected a gain change
    #[error("Hardware control failed: {0}")]
    HardwareControlFailure(String),

    /// The player exited non-zero or timed out
    #[error("Playback failed: {0}")]
    PlaybackFailure(String),

    /// Source and sink profiles cannot form a playback chain
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// The track list could not be obtained at all
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlaybackError {
    /// Whether this error ends the whole session instead of one track
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::InvalidProfile(_) | Self::Io(_))
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
