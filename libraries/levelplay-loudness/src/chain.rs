//! Playback chain electrical model
//!
//! A source (DAC / headphone output) drives a sink (headphone / speaker)
//! through a voltage divider formed by the source's output impedance and the
//! sink's load impedance:
//!
//! ```text
//!   Vout ──[ Zout ]──┬── Vloaded
//!                    │
//!                 [ Zload ]
//!                    │
//!                   GND
//!
//!   Vloaded = Vout * Zload / (Zout + Zload)
//!   max SPL = sensitivity (dB SPL / V) + 20 * log10(Vloaded)
//! ```
//!
//! `max_spl` is how loud 0 dBFS is, acoustically, through this exact pair.
//! Every per-track gain is measured from it.

use crate::error::{LoudnessError, Result};
use levelplay_core::{SinkProfile, SourceProfile, VolumeControl};
use std::fmt;

/// Derived properties of a (source, sink) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackChain {
    /// Zout + Zload (ohms)
    pub total_impedance: f64,

    /// Voltage across the load at 0 dBFS (volts)
    pub loaded_voltage: f64,

    /// Acoustic level at 0 dBFS and unity digital gain (dB SPL)
    pub max_spl: f64,

    /// Where the source takes its attenuation
    pub volume_control: VolumeControl,
}

impl fmt::Display for PlaybackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Z total: {:.1} ohm, V loaded: {:.3} V, max SPL: {:.1} dB",
            self.total_impedance, self.loaded_voltage, self.max_spl
        )
    }
}

/// Compute the chain for a source driving a sink
///
/// Pure: the result depends only on the two profiles and is recomputed
/// whenever either changes.
///
/// # Errors
/// Returns `InvalidProfile` if an impedance or the output voltage is not a
/// positive finite number, or if the sink sensitivity is not finite.
pub fn compute_chain(source: &SourceProfile, sink: &SinkProfile) -> Result<PlaybackChain> {
    require_positive("source output impedance", source.output_impedance)?;
    require_positive("sink load impedance", sink.load_impedance)?;
    require_positive("source output voltage", source.vout)?;
    if !sink.sensitivity.is_finite() {
        return Err(LoudnessError::InvalidProfile(format!(
            "sink sensitivity must be finite, got {}",
            sink.sensitivity
        )));
    }

    let total_impedance = source.output_impedance + sink.load_impedance;
    let loaded_voltage = source.vout * sink.load_impedance / total_impedance;
    let max_spl = sink.sensitivity + 20.0 * loaded_voltage.log10();

    Ok(PlaybackChain {
        total_impedance,
        loaded_voltage,
        max_spl,
        volume_control: source.volume_control,
    })
}

fn require_positive(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LoudnessError::InvalidProfile(format!(
            "{} must be positive, got {}",
            what, value
        )))
    }
}
