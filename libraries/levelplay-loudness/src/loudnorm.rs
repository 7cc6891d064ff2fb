//! ffmpeg `loudnorm` measurement backend
//!
//! ffmpeg interleaves progress logging with a trailing JSON block:
//!
//! ```text
//! size=N/A time=00:03:12.00 bitrate=N/A speed= 410x
//! [Parsed_loudnorm_0 @ 0x55d0c8c0]
//! {
//!     "input_i" : "-9.43",
//!     "input_tp" : "0.27",
//!     "input_lra" : "4.90",
//!     ...
//! }
//! ```
//!
//! Only the last `tail_lines` lines of the combined output are treated as
//! structured data; anything before the opening brace is discarded.

use crate::analyzer::{LoudnessMeasurement, LoudnessMeter, LoudnessTarget};
use crate::error::{LoudnessError, Result};
use async_trait::async_trait;
use levelplay_core::ExternalTool;
use serde_json::{Map, Value};
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;

/// Lines in the result block ffmpeg prints (braces plus ten fields)
pub const DEFAULT_TAIL_LINES: usize = 12;

/// Values read from the `loudnorm` result block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnormReport {
    /// `input_i`
    pub input_i: f64,
    /// `input_lra`
    pub input_lra: f64,
    /// `input_tp`, if present
    pub input_tp: Option<f64>,
}

/// Loudness meter that runs ffmpeg's `loudnorm` filter in analysis mode
#[derive(Debug, Clone)]
pub struct FfmpegLoudnorm {
    ffmpeg: ExternalTool,
    target: LoudnessTarget,
    tail_lines: usize,
}

impl FfmpegLoudnorm {
    /// Create a meter around an ffmpeg tool handle
    pub fn new(ffmpeg: ExternalTool, target: LoudnessTarget) -> Self {
        Self {
            ffmpeg,
            target,
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Override how many trailing lines are parsed
    #[must_use]
    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines.max(1);
        self
    }

    /// Target profile handed to ffmpeg
    pub fn target(&self) -> LoudnessTarget {
        self.target
    }

    fn filter(&self) -> String {
        format!(
            "loudnorm=I={}:LRA={}:TP={}:print_format=json",
            self.target.integrated, self.target.range, self.target.true_peak
        )
    }
}

#[async_trait]
impl LoudnessMeter for FfmpegLoudnorm {
    fn name(&self) -> &str {
        "ffmpeg-loudnorm"
    }

    async fn measure(&self, path: &Path) -> Result<LoudnessMeasurement> {
        let filter = self.filter();
        let output = self
            .ffmpeg
            .run([
                OsStr::new("-hide_banner"),
                OsStr::new("-nostdin"),
                OsStr::new("-i"),
                path.as_os_str(),
                OsStr::new("-af"),
                OsStr::new(&filter),
                OsStr::new("-f"),
                OsStr::new("null"),
                OsStr::new("-"),
            ])
            .await
            .map_err(|e| LoudnessError::MeasurementUnavailable(e.to_string()))?;

        let report = parse_loudnorm_output(&output.combined(), self.tail_lines)?;
        debug!(
            input_i = report.input_i,
            input_lra = report.input_lra,
            input_tp = ?report.input_tp,
            "loudnorm analysis finished"
        );

        Ok(LoudnessMeasurement {
            integrated_lufs: report.input_i,
            loudness_range_lu: report.input_lra,
            true_peak_ceiling_db: self.target.true_peak,
            true_peak_dbtp: report.input_tp,
        })
    }
}

/// Parse the trailing `loudnorm` JSON block out of ffmpeg's combined output
///
/// # Errors
/// Returns `MeasurementParseError` if the tail holds no JSON object, or the
/// object lacks a numeric `input_i` or `input_lra`.
pub fn parse_loudnorm_output(output: &str, tail_lines: usize) -> Result<LoudnormReport> {
    let lines: Vec<&str> = output.lines().collect();
    let tail = &lines[lines.len().saturating_sub(tail_lines)..];

    let start = tail
        .iter()
        .position(|line| line.trim_start().starts_with('{'))
        .ok_or_else(|| {
            LoudnessError::MeasurementParseError("no result block in output".to_string())
        })?;
    let end = tail
        .iter()
        .rposition(|line| line.trim_end().ends_with('}'))
        .filter(|&end| end >= start)
        .ok_or_else(|| {
            LoudnessError::MeasurementParseError("unterminated result block".to_string())
        })?;

    let block = tail[start..=end].join("\n");
    let fields: Map<String, Value> = serde_json::from_str(&block)
        .map_err(|e| LoudnessError::MeasurementParseError(e.to_string()))?;

    Ok(LoudnormReport {
        input_i: required_number(&fields, "input_i")?,
        input_lra: required_number(&fields, "input_lra")?,
        input_tp: number(&fields, "input_tp")?,
    })
}

fn required_number(fields: &Map<String, Value>, key: &str) -> Result<f64> {
    number(fields, key)?
        .ok_or_else(|| LoudnessError::MeasurementParseError(format!("missing field '{}'", key)))
}

/// ffmpeg prints numbers as strings (`"-inf"` for silence)
fn number(fields: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            LoudnessError::MeasurementParseError(format!("field '{}' is not a number: '{}'", key, s))
        }),
        Some(other) => Err(LoudnessError::MeasurementParseError(format!(
            "field '{}' has unexpected type: {}",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FFMPEG_OUTPUT: &str = r#"Input #0, wav, from '/tmp/levelplay/levelplay-0001-staged.wav':
  Duration: 00:03:12.00, bitrate: 3072 kb/s
  Stream #0:0: Audio: pcm_s32le ([1][0][0][0] / 0x0001), 48000 Hz, 2 channels, s32, 3072 kb/s
Stream mapping:
  Stream #0:0 -> #0:0 (pcm_s32le (native) -> pcm_s16le (native))
size=N/A time=00:03:12.00 bitrate=N/A speed= 410x
[Parsed_loudnorm_0 @ 0x55d0c8c0a340]
{
	"input_i" : "-9.43",
	"input_tp" : "0.27",
	"input_lra" : "4.90",
	"input_thresh" : "-19.61",
	"output_i" : "-24.26",
	"output_tp" : "-4.89",
	"output_lra" : "3.80",
	"output_thresh" : "-34.38",
	"normalization_type" : "dynamic",
	"target_offset" : "0.26"
}
"#;

    #[test]
    fn test_parse_trailing_block() {
        let report = parse_loudnorm_output(FFMPEG_OUTPUT, DEFAULT_TAIL_LINES).unwrap();
        assert!((report.input_i - (-9.43)).abs() < 1e-9);
        assert!((report.input_lra - 4.90).abs() < 1e-9);
        assert_eq!(report.input_tp, Some(0.27));
    }

    #[test]
    fn test_prefix_lines_inside_tail_are_discarded() {
        // A generous tail still reaches back into progress logging
        let report = parse_loudnorm_output(FFMPEG_OUTPUT, 15).unwrap();
        assert!((report.input_i - (-9.43)).abs() < 1e-9);
    }

    #[test]
    fn test_silence_parses_as_negative_infinity() {
        let output = "progress\n{\n\"input_i\" : \"-inf\",\n\"input_lra\" : \"0.00\",\n\"input_tp\" : \"-inf\"\n}\n";
        let report = parse_loudnorm_output(output, DEFAULT_TAIL_LINES).unwrap();
        assert!(report.input_i.is_infinite() && report.input_i < 0.0);
    }

    #[test]
    fn test_numeric_json_values_accepted() {
        let output = "{\"input_i\": -14.5, \"input_lra\": 6}";
        let report = parse_loudnorm_output(output, DEFAULT_TAIL_LINES).unwrap();
        assert!((report.input_i - (-14.5)).abs() < 1e-9);
        assert_eq!(report.input_tp, None);
    }

    #[test]
    fn test_missing_block_is_parse_error() {
        let result = parse_loudnorm_output("size=N/A time=00:00:01\n", DEFAULT_TAIL_LINES);
        assert!(matches!(
            result,
            Err(LoudnessError::MeasurementParseError(_))
        ));
    }

    #[test]
    fn test_block_outside_tail_is_not_found() {
        let mut output = String::from("{\n\"input_i\" : \"-9\",\n\"input_lra\" : \"1\"\n}\n");
        for i in 0..20 {
            output.push_str(&format!("trailing log {}\n", i));
        }
        assert!(parse_loudnorm_output(&output, DEFAULT_TAIL_LINES).is_err());
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let output = "{\n\"input_i\" : \"-9.43\"\n}";
        match parse_loudnorm_output(output, DEFAULT_TAIL_LINES) {
            Err(LoudnessError::MeasurementParseError(msg)) => assert!(msg.contains("input_lra")),
            other => panic!("Expected MeasurementParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_value_is_parse_error() {
        let output = "{\n\"input_i\" : \"loud\",\n\"input_lra\" : \"1\"\n}";
        assert!(matches!(
            parse_loudnorm_output(output, DEFAULT_TAIL_LINES),
            Err(LoudnessError::MeasurementParseError(_))
        ));
    }

    #[test]
    fn test_filter_arguments() {
        let meter = FfmpegLoudnorm::new(
            ExternalTool::new("ffmpeg", "ffmpeg", Duration::from_secs(1)),
            LoudnessTarget {
                integrated: -23.0,
                range: 7.0,
                true_peak: -1.0,
            },
        );
        assert_eq!(meter.filter(), "loudnorm=I=-23:LRA=7:TP=-1:print_format=json");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_ffmpeg_is_unavailable() {
        let meter = FfmpegLoudnorm::new(
            ExternalTool::new(
                "ffmpeg",
                "/nonexistent/levelplay-ffmpeg",
                Duration::from_secs(1),
            ),
            LoudnessTarget::default(),
        );
        let result = meter.measure(Path::new("/tmp/none.wav")).await;
        assert!(matches!(
            result,
            Err(LoudnessError::MeasurementUnavailable(_))
        ));
    }
}
