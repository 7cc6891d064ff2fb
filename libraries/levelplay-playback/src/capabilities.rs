//! External capabilities the orchestrator drives
//!
//! Decoding, rate conversion, loudness measurement, hardware mixing and
//! playback are never implemented here. Each is a trait so the session can
//! run against real subprocesses (see [`crate::tools`]) or in-memory fakes.

use async_trait::async_trait;
use levelplay_core::{Result, SampleFormat};
use levelplay_loudness::LoudnessMeter;
use std::path::Path;
use std::sync::Arc;

/// Extracts a stream into a lossless local buffer without re-encoding
#[async_trait]
pub trait Decoder: Send + Sync {
    /// Copy the audio stream at `locator` into `output`
    async fn extract(&self, locator: &str, output: &Path) -> Result<()>;
}

/// Expands a losslessly folded high-resolution encoding
#[async_trait]
pub trait Unfolder: Send + Sync {
    /// Decode `input` into a full-resolution `output`
    async fn unfold(&self, input: &Path, output: &Path) -> Result<()>;
}

/// One rate-conversion / gain-staging pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion<'a> {
    /// Input buffer
    pub input: &'a Path,
    /// Output buffer
    pub output: &'a Path,
    /// Signed gain applied to the samples (dB, never positive)
    pub gain_db: f64,
    /// Target sample rate; `None` keeps the input rate
    pub sample_rate_hz: Option<u32>,
    /// Output bit depth
    pub bit_depth: u16,
}

/// Peak-safe rate conversion with a gain stage
#[async_trait]
pub trait Resampler: Send + Sync {
    /// Run one conversion pass
    async fn convert(&self, conversion: &Conversion<'_>) -> Result<()>;
}

/// Persistent hardware attenuation
#[async_trait]
pub trait HardwareMixer: Send + Sync {
    /// Set `control` on sound card `card` to `gain_db`
    async fn set_gain(&self, card: u32, control: &str, gain_db: i32) -> Result<()>;
}

/// A request to play a final buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest<'a> {
    /// Output device id
    pub device: &'a str,
    /// Sample format to open the device with
    pub format: SampleFormat,
    /// Sample rate to open the device with
    pub sample_rate_hz: u32,
    /// Final buffer
    pub path: &'a Path,
}

/// Bit-exact playback
#[async_trait]
pub trait Player: Send + Sync {
    /// Play to completion, bypassing OS resampling and software volume
    async fn play(&self, request: &PlayRequest<'_>) -> Result<()>;
}

/// Every capability a session needs
#[derive(Clone)]
pub struct Capabilities {
    /// Stream extraction
    pub decoder: Arc<dyn Decoder>,
    /// Folded-encoding decoder, when installed
    pub unfolder: Option<Arc<dyn Unfolder>>,
    /// Rate conversion and gain staging
    pub resampler: Arc<dyn Resampler>,
    /// Loudness measurement
    pub meter: Arc<dyn LoudnessMeter>,
    /// Hardware volume control
    pub mixer: Arc<dyn HardwareMixer>,
    /// Audio output
    pub player: Arc<dyn Player>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("meter", &self.meter.name())
            .field("unfolder", &self.unfolder.is_some())
            .finish_non_exhaustive()
    }
}
