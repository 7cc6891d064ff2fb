//! Playback chain model, loudness measurement and gain policy for levelplay
//!
//! This crate provides:
//! - The electrical model of a source driving a sink (`compute_chain`)
//! - Loudness measurement of staged audio (ffmpeg `loudnorm` or in-process EBU R128)
//! - Overload-protection headroom
//! - The gain policy that splits a correction between analog and digital stages
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐
//! │ Source, Sink │ ──► │ PlaybackChain │ ─────────────┐
//! └──────────────┘     └───────────────┘              ▼
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │ Staged audio │ ──► │ LoudnessMeter │ ──► │  GainPolicy  │ ──► GainDecision
//! └──────────────┘     └───────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use levelplay_core::{SampleFormat, SinkProfile, SourceProfile, VolumeControl};
//! use levelplay_loudness::{compute_chain, GainPolicy, LoudnessMeasurement, OverloadHeadroom};
//!
//! let source = SourceProfile {
//!     vout: 2.0,
//!     output_impedance: 1.0,
//!     sample_rate_khz: 96.0,
//!     sample_format: SampleFormat::S24_3LE,
//!     volume_control: VolumeControl::Analog,
//!     card: 1,
//!     mixer_control: "PCM".to_string(),
//!     device: "hw:1,0".to_string(),
//! };
//! let sink = SinkProfile { load_impedance: 32.0, sensitivity: 100.0 };
//!
//! let chain = compute_chain(&source, &sink).unwrap();
//! let policy = GainPolicy::new(75.0, OverloadHeadroom::default());
//! let measurement = LoudnessMeasurement {
//!     integrated_lufs: -9.0,
//!     loudness_range_lu: 4.0,
//!     true_peak_ceiling_db: -2.0,
//!     true_peak_dbtp: None,
//! };
//!
//! let decision = policy.decide(&measurement, &chain).unwrap();
//! assert!(decision.analog_gain_db < 0);
//! assert_eq!(decision.digital_gain_db, 0.0);
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod chain;
mod error;
mod gain;
pub mod headroom;
mod loudnorm;
mod r128;

pub use analyzer::{LoudnessMeasurement, LoudnessMeter, LoudnessTarget};
pub use chain::{compute_chain, PlaybackChain};
pub use error::{LoudnessError, Result};
pub use gain::{decide, GainDecision, GainPolicy};
pub use headroom::{OverloadHeadroom, DEFAULT_OVERLOAD_HEADROOM_DB};
pub use loudnorm::{parse_loudnorm_output, FfmpegLoudnorm, LoudnormReport, DEFAULT_TAIL_LINES};
pub use r128::{measure_wav, Ebur128Meter};

/// Default acoustic target level (dB SPL)
pub const DEFAULT_TARGET_SPL: f64 = 75.0;
