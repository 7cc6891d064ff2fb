//! Session settings

use levelplay_loudness::{OverloadHeadroom, DEFAULT_TARGET_SPL};
use std::path::PathBuf;

/// Prefix every working file carries
pub const DEFAULT_FILE_PREFIX: &str = "levelplay-";

/// Settings for one playback session
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Desired acoustic level (dB SPL)
    pub target_spl: f64,

    /// Overload headroom applied while staging
    pub headroom: OverloadHeadroom,

    /// Directory holding per-track working files
    pub work_dir: PathBuf,

    /// Working-file name prefix; files with it are purged at session start
    pub file_prefix: String,

    /// Stop after this many attempted tracks
    pub max_tracks: Option<usize>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            target_spl: DEFAULT_TARGET_SPL,
            headroom: OverloadHeadroom::default(),
            work_dir: std::env::temp_dir().join("levelplay"),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            max_tracks: None,
        }
    }
}
