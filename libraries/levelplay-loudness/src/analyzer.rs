//! Loudness measurement of the staged intermediate
//!
//! The meter measures the *source material* after overload headroom and
//! rate conversion, never the output hardware. It always runs against a
//! fixed target profile, independent of the playback chain.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Target profile handed to the measurement pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessTarget {
    /// Integrated loudness target (LUFS)
    pub integrated: f64,

    /// Loudness range target (LU)
    pub range: f64,

    /// True-peak ceiling (dBTP)
    pub true_peak: f64,
}

impl Default for LoudnessTarget {
    fn default() -> Self {
        Self {
            integrated: -24.0,
            range: 7.0,
            true_peak: -2.0,
        }
    }
}

/// Per-track measurement result
///
/// Consumed by the gain policy and discarded once the decision is made.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessMeasurement {
    /// Integrated loudness (LUFS)
    pub integrated_lufs: f64,

    /// Loudness range (LU)
    pub loudness_range_lu: f64,

    /// True-peak ceiling the pass was run with (dBTP)
    pub true_peak_ceiling_db: f64,

    /// Measured true peak (dBTP), when the meter reports one
    pub true_peak_dbtp: Option<f64>,
}

impl fmt::Display for LoudnessMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loudness: {:.1} LUFS, Range: {:.1} LU",
            self.integrated_lufs, self.loudness_range_lu
        )?;
        if let Some(tp) = self.true_peak_dbtp {
            write!(f, ", True Peak: {:.1} dBTP", tp)?;
        }
        Ok(())
    }
}

/// A loudness measurement capability
#[async_trait]
pub trait LoudnessMeter: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Measure a staged audio file
    ///
    /// # Errors
    /// - `MeasurementUnavailable` if the capability is missing or fails
    /// - `MeasurementParseError` if its result cannot be read
    async fn measure(&self, path: &Path) -> Result<LoudnessMeasurement>;
}
