//! Error types for the chain model, loudness measurement and gain policy

use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur while modelling the chain, measuring or deciding gain
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// Source or sink values the electrical model cannot use
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// The measurement capability is missing, failed or timed out
    #[error("Loudness measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// The measurement ran but its result block could not be read
    #[error("Failed to parse loudness measurement: {0}")]
    MeasurementParseError(String),

    /// Integrated loudness is not a finite number (e.g. digital silence)
    #[error("Invalid measurement: integrated loudness is {0}")]
    InvalidMeasurement(f64),

    /// Overload headroom must be a finite, non-positive dB value
    #[error("Invalid headroom: {0} dB (must be finite and <= 0)")]
    InvalidHeadroom(f64),

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),

    /// Intermediate WAV could not be read
    #[error("Failed to read WAV intermediate: {0}")]
    Wav(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LoudnessError {
    /// Whether a track must be skipped because no trustworthy measurement exists
    pub fn is_measurement_error(&self) -> bool {
        matches!(
            self,
            Self::MeasurementUnavailable(_)
                | Self::MeasurementParseError(_)
                | Self::InvalidMeasurement(_)
                | Self::AnalysisError(_)
                | Self::Wav(_)
        )
    }
}

impl From<ebur128::Error> for LoudnessError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}

impl From<hound::Error> for LoudnessError {
    fn from(err: hound::Error) -> Self {
        Self::Wav(err.to_string())
    }
}
