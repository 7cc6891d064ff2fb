//! In-process EBU R128 measurement backend
//!
//! Reads the staged WAV intermediate with `hound` and feeds it to the
//! `ebur128` crate. Measures:
//! - Integrated loudness (LUFS) - the overall perceived loudness
//! - Loudness range (LRA) - the variation in loudness
//! - True peak (dBTP) - the maximum inter-sample peak level
//!
//! Digital silence yields an integrated loudness of negative infinity; it is
//! reported as-is and rejected by the gain policy.

use crate::analyzer::{LoudnessMeasurement, LoudnessMeter, LoudnessTarget};
use crate::error::{LoudnessError, Result};
use async_trait::async_trait;
use ebur128::{EbuR128, Mode};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Frames handed to the analyzer per call
const BLOCK_FRAMES: usize = 4096;

/// Loudness meter backed by the `ebur128` crate
#[derive(Debug, Clone, Default)]
pub struct Ebur128Meter {
    target: LoudnessTarget,
}

impl Ebur128Meter {
    /// Create a meter; only the target's true-peak ceiling is recorded
    pub fn new(target: LoudnessTarget) -> Self {
        Self { target }
    }
}

#[async_trait]
impl LoudnessMeter for Ebur128Meter {
    fn name(&self) -> &str {
        "ebur128"
    }

    async fn measure(&self, path: &Path) -> Result<LoudnessMeasurement> {
        let path: PathBuf = path.to_path_buf();
        let target = self.target;
        tokio::task::spawn_blocking(move || measure_wav(&path, target))
            .await
            .map_err(|e| LoudnessError::MeasurementUnavailable(e.to_string()))?
    }
}

/// Measure a WAV file synchronously
///
/// # Errors
/// - `Wav` if the file cannot be opened or decoded
/// - `AnalysisError` if the format is unsupported by the analyzer or the
///   file holds no complete frame
pub fn measure_wav(path: &Path, target: LoudnessTarget) -> Result<LoudnessMeasurement> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = u32::from(spec.channels);

    // Mode::I = Integrated loudness
    // Mode::LRA = Loudness range
    // Mode::TRUE_PEAK = Inter-sample peak (4x oversampling)
    let mode = Mode::I | Mode::LRA | Mode::TRUE_PEAK;
    let mut analyzer = EbuR128::new(channels, spec.sample_rate, mode)?;

    let block_len = BLOCK_FRAMES * channels as usize;
    let mut block: Vec<f32> = Vec::with_capacity(block_len);
    let mut frames = 0usize;

    let mut push = |sample: f32, block: &mut Vec<f32>| -> Result<()> {
        block.push(sample);
        if block.len() == block_len {
            analyzer.add_frames_f32(block)?;
            frames += BLOCK_FRAMES;
            block.clear();
        }
        Ok(())
    };

    match spec.sample_format {
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                push(sample?, &mut block)?;
            }
        }
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            for sample in reader.samples::<i32>() {
                push(sample? as f32 * scale, &mut block)?;
            }
        }
    }
    drop(push);

    // A truncated file may end mid-frame
    let whole = block.len() - block.len() % channels as usize;
    block.truncate(whole);
    if !block.is_empty() {
        analyzer.add_frames_f32(&block)?;
        frames += block.len() / channels as usize;
    }

    if frames == 0 {
        return Err(LoudnessError::AnalysisError(format!(
            "no audio frames in {}",
            path.display()
        )));
    }

    let integrated_lufs = analyzer.loudness_global()?;
    let loudness_range_lu = analyzer.loudness_range().unwrap_or(0.0);

    // Maximum across all channels
    let mut true_peak_linear = 0.0_f64;
    for ch in 0..channels {
        let peak = analyzer.true_peak(ch).unwrap_or(0.0);
        if peak > true_peak_linear {
            true_peak_linear = peak;
        }
    }
    let true_peak_dbtp = if true_peak_linear > 0.0 {
        20.0 * true_peak_linear.log10()
    } else {
        -f64::INFINITY
    };

    debug!(
        path = %path.display(),
        frames,
        integrated_lufs,
        loudness_range_lu,
        true_peak_dbtp,
        "EBU R128 analysis finished"
    );

    Ok(LoudnessMeasurement {
        integrated_lufs,
        loudness_range_lu,
        true_peak_ceiling_db: target.true_peak,
        true_peak_dbtp: Some(true_peak_dbtp),
    })
}
