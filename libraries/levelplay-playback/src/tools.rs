//! Subprocess-backed capabilities
//!
//! | Capability       | Tool     | Invocation                                              |
//! |------------------|----------|---------------------------------------------------------|
//! | `Decoder`        | ffmpeg   | `-i <locator> -map 0:a:0 -c copy <out.flac>`            |
//! | `Unfolder`       | any      | `<in> <out>`                                            |
//! | `Resampler`      | sox      | `<in> -e signed-integer -b N <out> gain G [rate -v R]`  |
//! | `HardwareMixer`  | amixer   | `-c <card> -q sset <control> <G>dB`                     |
//! | `Player`         | aplay    | `-D <dev> -f <fmt> -r <rate> --disable-resample ...`    |

use crate::capabilities::{Conversion, Decoder, HardwareMixer, PlayRequest, Player, Resampler, Unfolder};
use async_trait::async_trait;
use levelplay_core::{ExternalTool, Result};
use std::ffi::OsString;
use std::path::Path;

/// ffmpeg in stream-copy mode
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    ffmpeg: ExternalTool,
}

impl FfmpegDecoder {
    /// Wrap an ffmpeg tool handle
    pub fn new(ffmpeg: ExternalTool) -> Self {
        Self { ffmpeg }
    }

    fn args(locator: &str, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(locator.into());
        args.extend(["-map", "0:a:0", "-c", "copy"].iter().map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }
}

#[async_trait]
impl Decoder for FfmpegDecoder {
    async fn extract(&self, locator: &str, output: &Path) -> Result<()> {
        self.ffmpeg.run(Self::args(locator, output)).await?;
        Ok(())
    }
}

/// Folded-encoding decoder taking `<input> <output>`
#[derive(Debug, Clone)]
pub struct CommandUnfolder {
    tool: ExternalTool,
}

impl CommandUnfolder {
    /// Wrap a decoder tool handle
    pub fn new(tool: ExternalTool) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl Unfolder for CommandUnfolder {
    async fn unfold(&self, input: &Path, output: &Path) -> Result<()> {
        self.tool.run([input.as_os_str(), output.as_os_str()]).await?;
        Ok(())
    }
}

/// sox with a gain effect and optional very-high-quality rate conversion
#[derive(Debug, Clone)]
pub struct SoxResampler {
    sox: ExternalTool,
}

impl SoxResampler {
    /// Wrap a sox tool handle
    pub fn new(sox: ExternalTool) -> Self {
        Self { sox }
    }

    fn args(conversion: &Conversion<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-V1".into(),
            conversion.input.as_os_str().to_owned(),
            "-e".into(),
            "signed-integer".into(),
            "-b".into(),
            conversion.bit_depth.to_string().into(),
            conversion.output.as_os_str().to_owned(),
            "gain".into(),
            conversion.gain_db.to_string().into(),
        ];
        if let Some(rate) = conversion.sample_rate_hz {
            args.extend([
                OsString::from("rate"),
                OsString::from("-v"),
                OsString::from(rate.to_string()),
            ]);
        }
        args
    }
}

#[async_trait]
impl Resampler for SoxResampler {
    async fn convert(&self, conversion: &Conversion<'_>) -> Result<()> {
        self.sox.run(Self::args(conversion)).await?;
        Ok(())
    }
}

/// ALSA mixer control through amixer
#[derive(Debug, Clone)]
pub struct AlsaMixer {
    amixer: ExternalTool,
}

impl AlsaMixer {
    /// Wrap an amixer tool handle
    pub fn new(amixer: ExternalTool) -> Self {
        Self { amixer }
    }

    fn args(card: u32, control: &str, gain_db: i32) -> Vec<String> {
        vec![
            "-c".to_string(),
            card.to_string(),
            "-q".to_string(),
            "sset".to_string(),
            control.to_string(),
            format!("{}dB", gain_db),
        ]
    }
}

#[async_trait]
impl HardwareMixer for AlsaMixer {
    async fn set_gain(&self, card: u32, control: &str, gain_db: i32) -> Result<()> {
        self.amixer.run(Self::args(card, control, gain_db)).await?;
        Ok(())
    }
}

/// aplay opened directly on the hardware device
#[derive(Debug, Clone)]
pub struct AplayPlayer {
    aplay: ExternalTool,
}

impl AplayPlayer {
    /// Wrap an aplay tool handle; its timeout bounds a whole track
    pub fn new(aplay: ExternalTool) -> Self {
        Self { aplay }
    }

    fn args(request: &PlayRequest<'_>) -> Vec<OsString> {
        vec![
            "-q".into(),
            "-D".into(),
            request.device.into(),
            "-f".into(),
            request.format.as_str().into(),
            "-r".into(),
            request.sample_rate_hz.to_string().into(),
            "--disable-resample".into(),
            "--disable-softvol".into(),
            request.path.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl Player for AplayPlayer {
    async fn play(&self, request: &PlayRequest<'_>) -> Result<()> {
        self.aplay.run(Self::args(request)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelplay_core::{LevelError, SampleFormat};
    use std::time::Duration;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_decoder_copies_stream() {
        let args = strings(FfmpegDecoder::args(
            "https://cdn.example/track.flac?token=x",
            Path::new("/tmp/levelplay/levelplay-0001-source.flac"),
        ));
        let copy = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[copy + 1], "copy");
        assert_eq!(args.last().unwrap(), "/tmp/levelplay/levelplay-0001-source.flac");
        assert!(args.contains(&"https://cdn.example/track.flac?token=x".to_string()));
    }

    #[test]
    fn test_staging_pass_applies_headroom_and_rate() {
        let args = strings(SoxResampler::args(&Conversion {
            input: Path::new("in.flac"),
            output: Path::new("staged.wav"),
            gain_db: -3.0,
            sample_rate_hz: Some(96_000),
            bit_depth: 32,
        }));
        assert_eq!(
            args,
            [
                "-V1", "in.flac", "-e", "signed-integer", "-b", "32", "staged.wav", "gain", "-3",
                "rate", "-v", "96000"
            ]
        );
    }

    #[test]
    fn test_final_pass_keeps_rate() {
        let args = strings(SoxResampler::args(&Conversion {
            input: Path::new("staged.wav"),
            output: Path::new("final.wav"),
            gain_db: -7.0,
            sample_rate_hz: None,
            bit_depth: 24,
        }));
        assert!(!args.contains(&"rate".to_string()));
        assert_eq!(&args[args.len() - 2..], ["gain", "-7"]);
    }

    #[test]
    fn test_mixer_arguments() {
        assert_eq!(
            AlsaMixer::args(1, "Digital", -12),
            ["-c", "1", "-q", "sset", "Digital", "-12dB"]
        );
        assert_eq!(AlsaMixer::args(0, "PCM", 0).last().unwrap(), "0dB");
    }

    #[test]
    fn test_player_bypasses_software_path() {
        let args = strings(AplayPlayer::args(&PlayRequest {
            device: "hw:1,0",
            format: SampleFormat::S24_3LE,
            sample_rate_hz: 96_000,
            path: Path::new("final.wav"),
        }));
        assert!(args.contains(&"--disable-resample".to_string()));
        assert!(args.contains(&"--disable-softvol".to_string()));
        let format = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[format + 1], "S24_3LE");
        let rate = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate + 1], "96000");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_mixer_failure_surfaces_tool_error() {
        let mixer = AlsaMixer::new(ExternalTool::new("amixer", "false", Duration::from_secs(5)));
        let result = mixer.set_gain(0, "PCM", -3).await;
        assert!(matches!(result, Err(LevelError::ToolFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_player_is_tool_missing() {
        let player = AplayPlayer::new(ExternalTool::new(
            "aplay",
            "/nonexistent/levelplay-aplay",
            Duration::from_secs(5),
        ));
        let result = player
            .play(&PlayRequest {
                device: "hw:0,0",
                format: SampleFormat::S16_LE,
                sample_rate_hz: 44_100,
                path: Path::new("/tmp/none.wav"),
            })
            .await;
        assert!(matches!(result, Err(LevelError::ToolMissing { .. })));
    }
}
