//! Overload-protection headroom
//!
//! A fixed attenuation applied while the decoded stream is resampled and
//! converted to the session format. Sample-rate conversion can reconstruct
//! inter-sample peaks above 0 dBFS; the headroom absorbs them before the
//! signal is measured.
//!
//! # Signal Flow
//!
//! ```text
//! Decode → [Headroom + Rate Conversion] → Measure → Gain Policy → Output
//! ```
//!
//! The gain policy's decision is a correction on top of the already padded
//! signal, so the headroom never enters the policy formula.
//!
//! # Example
//!
//! ```
//! use levelplay_loudness::headroom::OverloadHeadroom;
//!
//! let headroom = OverloadHeadroom::from_str("-3 dB").unwrap();
//! assert!((headroom.db() - (-3.0)).abs() < f64::EPSILON);
//! assert!((headroom.linear() - 0.708).abs() < 0.001);
//! ```

use crate::error::{LoudnessError, Result};
use std::fmt;

/// Default overload headroom in dB
pub const DEFAULT_OVERLOAD_HEADROOM_DB: f64 = -3.0;

/// Fixed, non-positive attenuation reserved for conversion overshoot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverloadHeadroom(f64);

impl OverloadHeadroom {
    /// Create from a dB value
    ///
    /// # Errors
    /// Returns `InvalidHeadroom` for positive or non-finite values
    pub fn new(db: f64) -> Result<Self> {
        if db.is_finite() && db <= 0.0 {
            Ok(Self(db))
        } else {
            Err(LoudnessError::InvalidHeadroom(db))
        }
    }

    /// No headroom at all
    pub fn none() -> Self {
        Self(0.0)
    }

    /// Parse from string for settings persistence
    ///
    /// Accepts `"-3"`, `"-3 dB"`, `"-3dB"` and `"off"` / `"none"` (0 dB).
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "off" | "none" | "disabled" => Some(Self::none()),
            _ => {
                let value = s.trim_end_matches("db").trim();
                value.parse::<f64>().ok().and_then(|db| Self::new(db).ok())
            }
        }
    }

    /// Attenuation in dB (<= 0)
    pub fn db(&self) -> f64 {
        self.0
    }

    /// Attenuation as a linear factor (<= 1)
    pub fn linear(&self) -> f64 {
        10.0_f64.powf(self.0 / 20.0)
    }
}

impl Default for OverloadHeadroom {
    fn default() -> Self {
        Self(DEFAULT_OVERLOAD_HEADROOM_DB)
    }
}

impl fmt::Display for OverloadHeadroom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dB", self.0)
    }
}
