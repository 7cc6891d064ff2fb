/// Application configuration
///
/// Layers, later ones winning:
/// 1. bundled defaults (`defaults.toml`, including the device catalog)
/// 2. `levelplay.toml` in the working directory, or the file named by `LEVELPLAY_CONFIG`
/// 3. `LEVELPLAY_<SECTION>__<KEY>` environment variables
use config::{Config, Environment, File, FileFormat};
use levelplay_catalog::CatalogConfig;
use levelplay_core::{DeviceCatalog, LevelError, Result, SinkProfile, SourceProfile};
use levelplay_loudness::{LoudnessTarget, OverloadHeadroom, DEFAULT_TAIL_LINES};
use levelplay_playback::PlaybackConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bundled defaults
pub const DEFAULTS: &str = include_str!("defaults.toml");

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "LEVELPLAY_CONFIG";

/// Config file picked up from the working directory
pub const LOCAL_CONFIG_FILE: &str = "levelplay.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogSettings,

    pub session: SessionSettings,

    #[serde(default)]
    pub loudness: LoudnessSettings,

    #[serde(default)]
    pub tools: ToolSettings,

    #[serde(default)]
    pub timeouts: TimeoutSettings,

    #[serde(default)]
    pub sources: BTreeMap<String, SourceProfile>,

    #[serde(default)]
    pub sinks: BTreeMap<String, SinkProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub url: String,

    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_country_code")]
    pub country_code: String,

    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Active source device name
    pub source: String,

    /// Active sink device name
    pub sink: String,

    #[serde(default = "default_target_spl")]
    pub target_spl: f64,

    #[serde(default = "default_headroom_db")]
    pub headroom_db: f64,

    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default)]
    pub max_tracks: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoudnessBackend {
    /// ffmpeg `loudnorm` in analysis mode
    Ffmpeg,
    /// In-process EBU R128 measurement
    Ebur128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoudnessSettings {
    #[serde(default = "default_backend")]
    pub backend: LoudnessBackend,

    #[serde(default = "default_integrated_target")]
    pub integrated_target: f64,

    #[serde(default = "default_range_target")]
    pub range_target: f64,

    #[serde(default = "default_true_peak_ceiling")]
    pub true_peak_ceiling: f64,

    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    #[serde(default = "default_sox")]
    pub sox: PathBuf,

    #[serde(default = "default_amixer")]
    pub amixer: PathBuf,

    #[serde(default = "default_aplay")]
    pub aplay: PathBuf,

    /// Decoder for folded high-resolution streams; unset skips the unfold step
    #[serde(default)]
    pub unfold_decoder: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutSettings {
    /// Stream extraction (network bound)
    #[serde(default = "default_fetch_secs")]
    pub fetch_secs: u64,

    /// Unfold, resample, measure and mixer calls
    #[serde(default = "default_process_secs")]
    pub process_secs: u64,

    /// One whole track of playback
    #[serde(default = "default_playback_secs")]
    pub playback_secs: u64,
}

impl AppConfig {
    /// Load configuration from the bundled defaults, config file and environment
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(LOCAL_CONFIG_FILE);
                local.exists().then_some(local)
            });
        Self::load_from(path.as_deref(), true)
    }

    /// Load from the bundled defaults plus an optional file, optionally
    /// reading environment overrides
    pub fn load_from(path: Option<&Path>, with_env: bool) -> Result<Self> {
        let mut settings =
            Config::builder().add_source(File::from_str(DEFAULTS, FileFormat::Toml));

        if let Some(path) = path {
            settings = settings.add_source(File::from(path).required(true));
        }

        // Override with environment variables (LEVELPLAY_SESSION__TARGET_SPL=80)
        if with_env {
            settings = settings.add_source(
                Environment::with_prefix("LEVELPLAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = settings
            .build()
            .map_err(|e| LevelError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| LevelError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.url.trim().is_empty() {
            return Err(LevelError::Config("catalog.url is required".to_string()));
        }

        self.devices()
            .pair(&self.session.source, &self.session.sink)?;

        if !self.session.target_spl.is_finite() {
            return Err(LevelError::Config(format!(
                "session.target_spl must be finite, got {}",
                self.session.target_spl
            )));
        }
        self.headroom()?;

        if self.session.file_prefix.is_empty() {
            return Err(LevelError::Config(
                "session.file_prefix must not be empty".to_string(),
            ));
        }
        if self.session.max_tracks == Some(0) {
            return Err(LevelError::Config(
                "session.max_tracks must be at least 1".to_string(),
            ));
        }
        if self.loudness.tail_lines == 0 {
            return Err(LevelError::Config(
                "loudness.tail_lines must be at least 1".to_string(),
            ));
        }

        for (name, secs) in [
            ("catalog.timeout_secs", self.catalog.timeout_secs),
            ("timeouts.fetch_secs", self.timeouts.fetch_secs),
            ("timeouts.process_secs", self.timeouts.process_secs),
            ("timeouts.playback_secs", self.timeouts.playback_secs),
        ] {
            if secs == 0 {
                return Err(LevelError::Config(format!("{} must be positive", name)));
            }
        }

        Ok(())
    }

    /// The static device catalog
    pub fn devices(&self) -> DeviceCatalog {
        DeviceCatalog {
            sources: self.sources.clone(),
            sinks: self.sinks.clone(),
        }
    }

    /// Overload headroom for the session
    pub fn headroom(&self) -> Result<OverloadHeadroom> {
        OverloadHeadroom::new(self.session.headroom_db)
            .map_err(|e| LevelError::Config(format!("session.headroom_db: {}", e)))
    }

    /// Target profile for the loudness pass
    pub fn loudness_target(&self) -> LoudnessTarget {
        LoudnessTarget {
            integrated: self.loudness.integrated_target,
            range: self.loudness.range_target,
            true_peak: self.loudness.true_peak_ceiling,
        }
    }

    /// Catalog client settings
    pub fn catalog_config(&self) -> CatalogConfig {
        let mut config = CatalogConfig::new(self.catalog.url.clone())
            .with_country_code(self.catalog.country_code.clone())
            .with_timeout(Duration::from_secs(self.catalog.timeout_secs));
        if let Some(token) = &self.catalog.access_token {
            config = config.with_token(token.clone());
        }
        config
    }

    /// Orchestrator settings
    pub fn playback_config(&self) -> Result<PlaybackConfig> {
        Ok(PlaybackConfig {
            target_spl: self.session.target_spl,
            headroom: self.headroom()?,
            work_dir: self.session.work_dir.clone(),
            file_prefix: self.session.file_prefix.clone(),
            max_tracks: self.session.max_tracks,
        })
    }
}

impl Default for LoudnessSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            integrated_target: default_integrated_target(),
            range_target: default_range_target(),
            true_peak_ceiling: default_true_peak_ceiling(),
            tail_lines: default_tail_lines(),
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            sox: default_sox(),
            amixer: default_amixer(),
            aplay: default_aplay(),
            unfold_decoder: None,
        }
    }
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            fetch_secs: default_fetch_secs(),
            process_secs: default_process_secs(),
            playback_secs: default_playback_secs(),
        }
    }
}

// Default values
fn default_country_code() -> String {
    "US".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    30
}

fn default_target_spl() -> f64 {
    levelplay_loudness::DEFAULT_TARGET_SPL
}

fn default_headroom_db() -> f64 {
    levelplay_loudness::DEFAULT_OVERLOAD_HEADROOM_DB
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("levelplay")
}

fn default_file_prefix() -> String {
    levelplay_playback::DEFAULT_FILE_PREFIX.to_string()
}

fn default_backend() -> LoudnessBackend {
    LoudnessBackend::Ffmpeg
}

fn default_integrated_target() -> f64 {
    LoudnessTarget::default().integrated
}

fn default_range_target() -> f64 {
    LoudnessTarget::default().range
}

fn default_true_peak_ceiling() -> f64 {
    LoudnessTarget::default().true_peak
}

fn default_tail_lines() -> usize {
    DEFAULT_TAIL_LINES
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_sox() -> PathBuf {
    PathBuf::from("sox")
}

fn default_amixer() -> PathBuf {
    PathBuf::from("amixer")
}

fn default_aplay() -> PathBuf {
    PathBuf::from("aplay")
}

fn default_fetch_secs() -> u64 {
    120
}

fn default_process_secs() -> u64 {
    300
}

fn default_playback_secs() -> u64 {
    1800
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_are_valid() {
        let config = AppConfig::load_from(None, false).unwrap();
        config.validate().unwrap();
        assert_eq!(config.session.source, "onboard");
        assert_eq!(config.loudness.backend, LoudnessBackend::Ffmpeg);
        assert_eq!(config.loudness.tail_lines, 12);
        assert!(config.tools.unfold_decoder.is_none());
    }

    #[test]
    fn test_every_bundled_pair_forms_a_chain() {
        let config = AppConfig::load_from(None, false).unwrap();
        let devices = config.devices();
        for source in devices.sources.values() {
            for sink in devices.sinks.values() {
                levelplay_loudness::compute_chain(source, sink).unwrap();
            }
        }
    }
}
