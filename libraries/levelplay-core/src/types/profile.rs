/// Electrical profiles of playback sources (DACs, headphone outputs) and sinks
/// (headphones, speakers).
///
/// Profiles are static data: they are loaded once from the device catalog at
/// startup and never mutated afterwards.
use crate::error::{LevelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sample format accepted by a source, named the way ALSA names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum SampleFormat {
    /// Signed 16-bit little endian
    S16_LE,
    /// Signed 24-bit little endian packed in 3 bytes
    S24_3LE,
    /// Signed 24-bit little endian in a 32-bit container
    S24_LE,
    /// Signed 32-bit little endian
    S32_LE,
}

impl SampleFormat {
    /// ALSA format tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S16_LE => "S16_LE",
            Self::S24_3LE => "S24_3LE",
            Self::S24_LE => "S24_LE",
            Self::S32_LE => "S32_LE",
        }
    }

    /// Parse from an ALSA format tag (case-insensitive)
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "S16_LE" => Some(Self::S16_LE),
            "S24_3LE" => Some(Self::S24_3LE),
            "S24_LE" => Some(Self::S24_LE),
            "S32_LE" => Some(Self::S32_LE),
            _ => None,
        }
    }

    /// Significant bits per sample
    #[must_use]
    pub fn bit_depth(&self) -> u16 {
        match self {
            Self::S16_LE => 16,
            Self::S24_3LE | Self::S24_LE => 24,
            Self::S32_LE => 32,
        }
    }
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where volume is controlled on a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeControl {
    /// Hardware attenuator with integer dB steps
    Analog,
    /// No hardware knob; gain is applied to the samples
    Software,
}

impl VolumeControl {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Software => "software",
        }
    }
}

impl std::fmt::Display for VolumeControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A playback source: DAC or headphone output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Unloaded output voltage at 0 dBFS (volts RMS)
    pub vout: f64,

    /// Output impedance (ohms)
    pub output_impedance: f64,

    /// Native sample rate (kHz, e.g. 44.1 or 96)
    pub sample_rate_khz: f64,

    /// Sample format the device is driven with
    pub sample_format: SampleFormat,

    /// Analog hardware attenuator or software-only gain
    pub volume_control: VolumeControl,

    /// ALSA card index of the hardware mixer
    #[serde(default)]
    pub card: u32,

    /// Mixer control adjusted for analog gain (e.g. "PCM")
    #[serde(default = "default_mixer_control")]
    pub mixer_control: String,

    /// Playback device handed to the player (e.g. "hw:1,0")
    pub device: String,
}

fn default_mixer_control() -> String {
    "PCM".to_string()
}

impl SourceProfile {
    /// Bits per sample derived from the sample format
    #[must_use]
    pub fn bit_depth(&self) -> u16 {
        self.sample_format.bit_depth()
    }

    /// Native sample rate in Hz
    #[must_use]
    pub fn sample_rate_hz(&self) -> u32 {
        (self.sample_rate_khz * 1000.0).round() as u32
    }
}

/// A transducer: headphone or speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkProfile {
    /// Load impedance (ohms)
    pub load_impedance: f64,

    /// Sensitivity (dB SPL per volt)
    pub sensitivity: f64,
}

/// Static device catalog keyed by device name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceCatalog {
    /// Known sources
    #[serde(default)]
    pub sources: BTreeMap<String, SourceProfile>,

    /// Known sinks
    #[serde(default)]
    pub sinks: BTreeMap<String, SinkProfile>,
}

impl DeviceCatalog {
    /// Look up a source by name
    pub fn source(&self, name: &str) -> Result<&SourceProfile> {
        self.sources
            .get(name)
            .ok_or_else(|| LevelError::unknown_device("source", name))
    }

    /// Look up a sink by name
    pub fn sink(&self, name: &str) -> Result<&SinkProfile> {
        self.sinks
            .get(name)
            .ok_or_else(|| LevelError::unknown_device("sink", name))
    }

    /// Pick the active (source, sink) pair for a session
    pub fn pair(&self, source: &str, sink: &str) -> Result<(&SourceProfile, &SinkProfile)> {
        Ok((self.source(source)?, self.sink(sink)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onboard() -> SourceProfile {
        SourceProfile {
            vout: 1.0,
            output_impedance: 2.0,
            sample_rate_khz: 44.1,
            sample_format: SampleFormat::S16_LE,
            volume_control: VolumeControl::Software,
            card: 0,
            mixer_control: "PCM".to_string(),
            device: "hw:0,0".to_string(),
        }
    }

    #[test]
    fn test_sample_format_bit_depth() {
        assert_eq!(SampleFormat::S16_LE.bit_depth(), 16);
        assert_eq!(SampleFormat::S24_3LE.bit_depth(), 24);
        assert_eq!(SampleFormat::S24_LE.bit_depth(), 24);
        assert_eq!(SampleFormat::S32_LE.bit_depth(), 32);
    }

    #[test]
    fn test_sample_format_parsing() {
        assert_eq!(SampleFormat::from_str("s24_3le"), Some(SampleFormat::S24_3LE));
        assert_eq!(SampleFormat::from_str("S32_LE"), Some(SampleFormat::S32_LE));
        assert_eq!(SampleFormat::from_str("FLOAT_LE"), None);
    }

    #[test]
    fn test_sample_rate_hz() {
        assert_eq!(onboard().sample_rate_hz(), 44_100);

        let mut hires = onboard();
        hires.sample_rate_khz = 96.0;
        assert_eq!(hires.sample_rate_hz(), 96_000);
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = DeviceCatalog::default();
        catalog.sources.insert("onboard".to_string(), onboard());
        catalog.sinks.insert(
            "hd600".to_string(),
            SinkProfile {
                load_impedance: 300.0,
                sensitivity: 97.0,
            },
        );

        let (source, sink) = catalog.pair("onboard", "hd600").unwrap();
        assert_eq!(source.bit_depth(), 16);
        assert!((sink.load_impedance - 300.0).abs() < f64::EPSILON);

        match catalog.sink("missing") {
            Err(LevelError::UnknownDevice { kind, name }) => {
                assert_eq!(kind, "sink");
                assert_eq!(name, "missing");
            }
            other => panic!("Expected UnknownDevice, got {:?}", other),
        }
    }

    #[test]
    fn test_source_profile_deserialize_defaults() {
        let json = r#"{
            "vout": 2.0,
            "output_impedance": 0.5,
            "sample_rate_khz": 96,
            "sample_format": "S24_3LE",
            "volume_control": "analog",
            "device": "hw:1,0"
        }"#;
        let source: SourceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(source.volume_control, VolumeControl::Analog);
        assert_eq!(source.mixer_control, "PCM");
        assert_eq!(source.card, 0);
    }
}
