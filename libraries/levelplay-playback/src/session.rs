//! Per-track working state
//!
//! A `TrackSession` lives for exactly one track. It owns the track's working
//! files through a [`TrackScope`], so dropping the session removes them
//! whether the track played or failed.

use crate::types::TrackState;
use crate::workdir::TrackScope;
use levelplay_core::TrackRecord;
use levelplay_loudness::{GainDecision, LoudnessMeasurement};
use std::path::{Path, PathBuf};

/// Containers that carry lossy AAC audio instead of a lossless stream
const UNSUPPORTED_CONTAINERS: [&str; 3] = [".m4a", ".mp4", ".aac"];

/// Working state of one track
#[derive(Debug)]
pub struct TrackSession {
    seq: usize,
    track: TrackRecord,
    state: TrackState,
    failed_at: Option<TrackState>,
    scope: TrackScope,
    pub(crate) locator: Option<String>,
    pub(crate) buffer: Option<PathBuf>,
    pub(crate) measurement: Option<LoudnessMeasurement>,
    pub(crate) decision: Option<GainDecision>,
}

impl TrackSession {
    /// Start a track in the `Resolved` state
    pub fn new(seq: usize, track: TrackRecord, scope: TrackScope) -> Self {
        Self {
            seq,
            track,
            state: TrackState::Resolved,
            failed_at: None,
            scope,
            locator: None,
            buffer: None,
            measurement: None,
            decision: None,
        }
    }

    /// Position in the session, starting at 1
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// Track being processed
    pub fn track(&self) -> &TrackRecord {
        &self.track
    }

    /// Current state
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// State the track was in when it failed
    pub fn failed_at(&self) -> Option<TrackState> {
        self.failed_at
    }

    /// Stream locator, once fetched
    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    /// Most recent working buffer
    pub fn buffer(&self) -> Option<&Path> {
        self.buffer.as_deref()
    }

    /// Loudness measurement, once taken
    pub fn measurement(&self) -> Option<&LoudnessMeasurement> {
        self.measurement.as_ref()
    }

    /// Gain decision, once made
    pub fn decision(&self) -> Option<&GainDecision> {
        self.decision.as_ref()
    }

    /// Allocate a working file for a stage
    pub(crate) fn working_file(&mut self, stage: &str, ext: &str) -> PathBuf {
        self.scope.file(stage, ext)
    }

    pub(crate) fn transition(&mut self, next: TrackState) {
        self.state = next;
    }

    pub(crate) fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.failed_at = Some(self.state);
            self.state = TrackState::Failed;
        }
    }
}

/// Whether a locator points at an AAC/MP4 container
///
/// Query strings and fragments are ignored when looking at the extension.
pub fn is_unsupported_container(locator: &str) -> bool {
    let path = locator
        .split(['?', '#'])
        .next()
        .unwrap_or(locator)
        .to_ascii_lowercase();
    UNSUPPORTED_CONTAINERS.iter().any(|ext| path.ends_with(ext))
}
