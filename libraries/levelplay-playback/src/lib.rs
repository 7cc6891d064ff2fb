//! levelplay - Playback Orchestration
//!
//! Sequences decode → measure → gain → play for every track of a session.
//!
//! This crate provides:
//! - Capability traits for the external decoder, resampler, loudness meter,
//!   hardware mixer and player
//! - Subprocess implementations over ffmpeg, sox, amixer and aplay
//! - A per-track state machine with scoped working files
//! - Track source policy (explicit collections, endless random favorites)
//! - Hardware mixer bookkeeping across tracks
//!
//! # Architecture
//!
//! The orchestrator never decodes, resamples or measures anything itself.
//! Every step is a capability, so the whole session can run against
//! in-memory fakes in tests.
//!
//! Tracks are processed strictly one at a time: the hardware mixer control
//! is shared, process-wide state and only one gain level may be active on it.
//!
//! # Example
//!
//! ```rust
//! use levelplay_playback::{TrackState, WorkDir};
//!
//! let workdir = WorkDir::new(std::env::temp_dir().join("levelplay"), "levelplay-");
//! let mut scope = workdir.track(1);
//! let staged = scope.file("staged", "wav");
//! assert!(staged.ends_with("levelplay-0001-staged.wav"));
//!
//! assert!(TrackState::Done.is_terminal());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod capabilities;
mod config;
mod error;
mod mixer;
mod orchestrator;
mod queue;
mod session;
pub mod tools;
pub mod types;
mod workdir;

pub use capabilities::{
    Capabilities, Conversion, Decoder, HardwareMixer, PlayRequest, Player, Resampler, Unfolder,
};
pub use config::{PlaybackConfig, DEFAULT_FILE_PREFIX};
pub use error::{PlaybackError, Result};
pub use mixer::MixerState;
pub use orchestrator::Orchestrator;
pub use queue::{pick_index, TrackQueue};
pub use session::{is_unsupported_container, TrackSession};
pub use tools::{AlsaMixer, AplayPlayer, CommandUnfolder, FfmpegDecoder, SoxResampler};
pub use types::{SessionReport, SkippedTrack, TrackState, RECENT_TRACK_HISTORY};
pub use workdir::{TrackScope, WorkDir};
