//! Gain policy: turn a loudness measurement into an analog/digital gain split
//!
//! ```text
//! target_relative = target_spl - chain.max_spl
//! raw_gain        = round(target_relative - integrated_loudness)
//! raw_gain        = min(raw_gain, 0)          // never boost
//!
//! Analog source:   analog = raw_gain, digital = 0
//! Software source: analog = 0,        digital = raw_gain
//! ```
//!
//! Analog sources take the whole correction on the integer-step hardware
//! control. The overload headroom was already applied during rate conversion
//! and is only carried along for reporting.

use crate::analyzer::LoudnessMeasurement;
use crate::chain::PlaybackChain;
use crate::error::{LoudnessError, Result};
use crate::headroom::OverloadHeadroom;
use levelplay_core::VolumeControl;
use std::fmt;

/// Per-track gain split
///
/// Invariant: `analog_gain_db + digital_gain_db <= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainDecision {
    /// Hardware attenuation in whole dB (0 for software-only sources)
    pub analog_gain_db: i32,

    /// Sample-scaling gain in dB
    pub digital_gain_db: f64,

    /// Overload headroom already applied upstream
    pub headroom_db: f64,
}

impl GainDecision {
    /// Combined analog and digital correction
    pub fn total_db(&self) -> f64 {
        f64::from(self.analog_gain_db) + self.digital_gain_db
    }

    /// Correction plus upstream headroom
    pub fn total_with_headroom_db(&self) -> f64 {
        self.total_db() + self.headroom_db
    }

    /// No correction at all
    pub fn is_unity(&self) -> bool {
        self.analog_gain_db == 0 && self.digital_gain_db == 0.0
    }
}

impl fmt::Display for GainDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analog {} dB, digital {:.1} dB (headroom {:.1} dB)",
            self.analog_gain_db, self.digital_gain_db, self.headroom_db
        )
    }
}

/// Decide the gain for one track
///
/// # Errors
/// - `InvalidMeasurement` if the integrated loudness is not finite
/// - `InvalidProfile` if the target level or chain reference is not finite
pub fn decide(
    measurement: &LoudnessMeasurement,
    chain: &PlaybackChain,
    target_spl: f64,
    headroom: OverloadHeadroom,
) -> Result<GainDecision> {
    if !measurement.integrated_lufs.is_finite() {
        return Err(LoudnessError::InvalidMeasurement(
            measurement.integrated_lufs,
        ));
    }
    if !target_spl.is_finite() || !chain.max_spl.is_finite() {
        return Err(LoudnessError::InvalidProfile(format!(
            "target SPL {} and chain max SPL {} must be finite",
            target_spl, chain.max_spl
        )));
    }

    let target_relative = target_spl - chain.max_spl;
    let raw_gain = (target_relative - measurement.integrated_lufs)
        .round()
        .min(0.0);
    // min(-0.0, 0.0) may keep the sign bit
    let raw_gain = if raw_gain == 0.0 { 0.0 } else { raw_gain };

    let decision = match chain.volume_control {
        VolumeControl::Analog => GainDecision {
            analog_gain_db: raw_gain as i32,
            digital_gain_db: 0.0,
            headroom_db: headroom.db(),
        },
        VolumeControl::Software => GainDecision {
            analog_gain_db: 0,
            digital_gain_db: raw_gain,
            headroom_db: headroom.db(),
        },
    };

    Ok(decision)
}

/// Session-wide gain policy settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainPolicy {
    /// Desired acoustic level (dB SPL)
    pub target_spl: f64,

    /// Overload headroom applied during rate conversion
    pub headroom: OverloadHeadroom,
}

impl GainPolicy {
    /// Create a policy
    pub fn new(target_spl: f64, headroom: OverloadHeadroom) -> Self {
        Self {
            target_spl,
            headroom,
        }
    }

    /// Decide the gain for one track against a chain
    pub fn decide(
        &self,
        measurement: &LoudnessMeasurement,
        chain: &PlaybackChain,
    ) -> Result<GainDecision> {
        decide(measurement, chain, self.target_spl, self.headroom)
    }
}
