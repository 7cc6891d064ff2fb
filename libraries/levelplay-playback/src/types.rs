//! Core types for track playback

use std::fmt;

/// Where a track is in its pipeline
///
/// ```text
/// Resolved → Decoded → Measured → GainApplied → Playing → Done
///     └──────────┴─────────┴───────────┴──────────┴──→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackState {
    /// Track record known, nothing fetched yet
    Resolved,
    /// Stream extracted into the working directory
    Decoded,
    /// Staged intermediate measured
    Measured,
    /// Gain decided, mixer written and final buffer encoded
    GainApplied,
    /// Handed to the player
    Playing,
    /// Played to completion
    Done,
    /// Skipped
    Failed,
}

impl TrackState {
    /// No further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Decoded => "decoded",
            Self::Measured => "measured",
            Self::GainApplied => "gain-applied",
            Self::Playing => "playing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A track the session gave up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTrack {
    /// Catalog track identifier
    pub track_id: String,
    /// State the track was in when it failed
    pub stage: TrackState,
    /// Human-readable cause
    pub reason: String,
}

/// Tracks kept per list in a bounded report
pub const RECENT_TRACK_HISTORY: usize = 100;

/// Outcome of a whole session
///
/// An unbounded report keeps every track. A bounded one (endless favorites)
/// keeps only the most recent tracks in `played`/`skipped` while the totals
/// keep counting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Track ids played to completion, in order
    pub played: Vec<String>,
    /// Tracks skipped, in order
    pub skipped: Vec<SkippedTrack>,
    played_total: usize,
    skipped_total: usize,
    retain: Option<usize>,
}

impl SessionReport {
    /// Report keeping at most `retain` entries per list
    pub fn bounded(retain: usize) -> Self {
        Self {
            retain: Some(retain),
            ..Self::default()
        }
    }

    /// Record a track played to completion
    pub fn record_played(&mut self, track_id: impl Into<String>) {
        self.played_total += 1;
        self.played.push(track_id.into());
        trim_front(&mut self.played, self.retain);
    }

    /// Record a skipped track
    pub fn record_skipped(&mut self, skipped: SkippedTrack) {
        self.skipped_total += 1;
        self.skipped.push(skipped);
        trim_front(&mut self.skipped, self.retain);
    }

    /// Tracks played over the whole session
    pub fn played_count(&self) -> usize {
        self.played_total
    }

    /// Tracks skipped over the whole session
    pub fn skipped_count(&self) -> usize {
        self.skipped_total
    }

    /// Tracks the session attempted
    pub fn attempted(&self) -> usize {
        self.played_total + self.skipped_total
    }

    /// Skipped track by id, among the retained ones
    pub fn skipped_track(&self, track_id: &str) -> Option<&SkippedTrack> {
        self.skipped.iter().find(|s| s.track_id == track_id)
    }
}

fn trim_front<T>(items: &mut Vec<T>, retain: Option<usize>) {
    if let Some(retain) = retain {
        if items.len() > retain {
            let excess = items.len() - retain;
            items.drain(..excess);
        }
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} played, {} skipped",
            self.played_total, self.skipped_total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TrackState::Done.is_terminal());
        assert!(TrackState::Failed.is_terminal());
        for state in [
            TrackState::Resolved,
            TrackState::Decoded,
            TrackState::Measured,
            TrackState::GainApplied,
            TrackState::Playing,
        ] {
            assert!(!state.is_terminal());
        }
    }

    #[test]
    fn test_report_counts() {
        let mut report = SessionReport::default();
        report.record_played("1");
        report.record_skipped(SkippedTrack {
            track_id: "2".to_string(),
            stage: TrackState::Resolved,
            reason: "404".to_string(),
        });
        report.record_played("3");
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.to_string(), "2 played, 1 skipped");
        assert_eq!(
            report.skipped_track("2").map(|s| s.stage),
            Some(TrackState::Resolved)
        );
        assert!(report.skipped_track("1").is_none());
    }

    #[test]
    fn test_bounded_report_keeps_recent_tracks() {
        let mut report = SessionReport::bounded(3);
        for i in 0..10 {
            report.record_played(i.to_string());
        }
        report.record_skipped(SkippedTrack {
            track_id: "x".to_string(),
            stage: TrackState::Decoded,
            reason: "decode".to_string(),
        });

        assert_eq!(report.played, ["7", "8", "9"]);
        assert_eq!(report.played_count(), 10);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.attempted(), 11);
        assert_eq!(report.to_string(), "10 played, 1 skipped");
    }

    #[test]
    fn test_default_report_is_unbounded() {
        let mut report = SessionReport::default();
        for i in 0..(RECENT_TRACK_HISTORY + 10) {
            report.record_played(i.to_string());
        }
        assert_eq!(report.played.len(), RECENT_TRACK_HISTORY + 10);
    }
}
