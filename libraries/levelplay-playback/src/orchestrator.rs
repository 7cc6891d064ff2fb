//! Playback orchestrator
//!
//! Drives each track through
//!
//! ```text
//! Resolved ──fetch locator, stream-copy extract──▶ Decoded
//! Decoded  ──[unfold], headroom + rate, measure──▶ Measured
//! Measured ──gain policy, mixer, final encode────▶ GainApplied
//! GainApplied ──────────────────────────────────▶ Playing ──player──▶ Done
//! ```
//!
//! strictly one track at a time. A failure in any transition skips the
//! track; only the initial collection lookup can end the session.

use crate::capabilities::{Capabilities, Conversion, PlayRequest};
use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::mixer::MixerState;
use crate::queue::TrackQueue;
use crate::session::{is_unsupported_container, TrackSession};
use crate::types::{SessionReport, SkippedTrack, TrackState, RECENT_TRACK_HISTORY};
use crate::workdir::WorkDir;
use levelplay_core::{
    format_track, format_track_detail, Catalog, CollectionRef, LevelError, SinkProfile,
    SourceProfile, VolumeControl,
};
use levelplay_loudness::{compute_chain, GainPolicy, PlaybackChain};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Intermediate bit depth for the staged buffer
const STAGING_BIT_DEPTH: u16 = 32;

/// Sequential per-track playback with level-matched gain
pub struct Orchestrator {
    catalog: Arc<dyn Catalog>,
    capabilities: Capabilities,
    source: SourceProfile,
    chain: PlaybackChain,
    policy: GainPolicy,
    mixer: MixerState,
    workdir: WorkDir,
    max_tracks: Option<usize>,
}

impl Orchestrator {
    /// Build an orchestrator for one (source, sink) pair
    ///
    /// # Errors
    /// Returns `InvalidProfile` if the pair cannot form a playback chain.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        capabilities: Capabilities,
        source: SourceProfile,
        sink: &SinkProfile,
        config: PlaybackConfig,
    ) -> Result<Self> {
        let chain = compute_chain(&source, sink)
            .map_err(|e| PlaybackError::InvalidProfile(e.to_string()))?;
        info!(
            chain = %chain,
            volume_control = %source.volume_control,
            target_spl = config.target_spl,
            headroom = %config.headroom,
            "Playback chain ready"
        );

        Ok(Self {
            catalog,
            capabilities,
            source,
            chain,
            policy: GainPolicy::new(config.target_spl, config.headroom),
            mixer: MixerState::new(),
            workdir: WorkDir::new(config.work_dir, config.file_prefix),
            max_tracks: config.max_tracks,
        })
    }

    /// The session's playback chain
    pub fn chain(&self) -> &PlaybackChain {
        &self.chain
    }

    /// Hardware mixer bookkeeping
    pub fn mixer(&self) -> MixerState {
        self.mixer
    }

    /// Resolve `reference` and play it
    ///
    /// # Errors
    /// Only fatal errors are returned: the working directory cannot be
    /// prepared, or the track list cannot be obtained.
    pub async fn run(&mut self, reference: &CollectionRef) -> Result<SessionReport> {
        let queue = TrackQueue::resolve(self.catalog.as_ref(), reference).await?;
        self.run_queue(queue).await
    }

    /// Play everything a queue yields, up to the session cap
    ///
    /// Stale working files are purged before the first track.
    pub async fn run_queue(&mut self, mut queue: TrackQueue) -> Result<SessionReport> {
        self.prepare().await?;
        // Endless sessions keep totals but only recent track lists
        let mut report = if queue.is_endless() {
            SessionReport::bounded(RECENT_TRACK_HISTORY)
        } else {
            SessionReport::default()
        };

        while self.max_tracks.map_or(true, |max| report.attempted() < max) {
            let Some(track) = queue.next(self.catalog.as_ref()).await? else {
                break;
            };

            let seq = report.attempted() + 1;
            let mut session = TrackSession::new(seq, track, self.workdir.track(seq));
            match self.play_track(&mut session).await {
                Ok(()) => report.record_played(session.track().id.clone()),
                Err(error) => {
                    let stage = session.failed_at().unwrap_or(TrackState::Resolved);
                    warn!(
                        track_id = %session.track().id,
                        track = %format_track(session.track()),
                        stage = %stage,
                        error = %error,
                        "Skipping track"
                    );
                    report.record_skipped(SkippedTrack {
                        track_id: session.track().id.clone(),
                        stage,
                        reason: error.to_string(),
                    });
                }
            }
            // Dropping the session removes its working files
        }

        info!(
            played = report.played_count(),
            skipped = report.skipped_count(),
            "Session finished"
        );
        Ok(report)
    }

    /// Run one track to `Done`, or to `Failed` with the cause
    pub async fn play_track(&mut self, session: &mut TrackSession) -> Result<()> {
        while !session.state().is_terminal() {
            let from = session.state();
            match self.advance(session).await {
                Ok(next) => {
                    debug!(track_id = %session.track().id, from = %from, to = %next, "Track state");
                    session.transition(next);
                }
                Err(error) => {
                    session.fail();
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    async fn advance(&mut self, session: &mut TrackSession) -> Result<TrackState> {
        match session.state() {
            TrackState::Resolved => {
                self.decode(session).await?;
                Ok(TrackState::Decoded)
            }
            TrackState::Decoded => {
                self.measure(session).await?;
                Ok(TrackState::Measured)
            }
            TrackState::Measured => {
                self.apply_gain(session).await?;
                Ok(TrackState::GainApplied)
            }
            TrackState::GainApplied => {
                info!(track = %format_track_detail(session.track()), "Now playing");
                Ok(TrackState::Playing)
            }
            TrackState::Playing => {
                self.play(session).await?;
                Ok(TrackState::Done)
            }
            state @ (TrackState::Done | TrackState::Failed) => Ok(state),
        }
    }

    async fn decode(&self, session: &mut TrackSession) -> Result<()> {
        let track_id = session.track().id.clone();
        let locator = self
            .catalog
            .stream_url(&track_id)
            .await
            .map_err(|e| match e {
                LevelError::StreamUnavailable { track_id, reason } => {
                    PlaybackError::StreamUnavailable { track_id, reason }
                }
                other => PlaybackError::StreamUnavailable {
                    track_id: track_id.clone(),
                    reason: other.to_string(),
                },
            })?;

        if is_unsupported_container(&locator) {
            return Err(PlaybackError::DecodeFailure(format!(
                "unsupported codec in {}",
                locator
            )));
        }

        let output = session.working_file("source", "flac");
        self.capabilities
            .decoder
            .extract(&locator, &output)
            .await
            .map_err(|e| PlaybackError::DecodeFailure(e.to_string()))?;

        session.locator = Some(locator);
        session.buffer = Some(output);
        Ok(())
    }

    async fn measure(&self, session: &mut TrackSession) -> Result<()> {
        let mut input = session
            .buffer
            .clone()
            .ok_or_else(|| PlaybackError::DecodeFailure("no decoded buffer".to_string()))?;

        if session.track().quality_tag.is_folded() {
            if let Some(unfolder) = &self.capabilities.unfolder {
                let unfolded = session.working_file("unfolded", "wav");
                match unfolder.unfold(&input, &unfolded).await {
                    Ok(()) => input = unfolded,
                    Err(e) => warn!(
                        track_id = %session.track().id,
                        error = %e,
                        "Unfold failed, continuing with the folded stream"
                    ),
                }
            }
        }

        let staged = session.working_file("staged", "wav");
        self.capabilities
            .resampler
            .convert(&Conversion {
                input: &input,
                output: &staged,
                gain_db: self.policy.headroom.db(),
                sample_rate_hz: Some(self.source.sample_rate_hz()),
                bit_depth: STAGING_BIT_DEPTH,
            })
            .await
            .map_err(|e| PlaybackError::ConversionFailure(e.to_string()))?;
        session.buffer = Some(staged.clone());

        let measurement = self.capabilities.meter.measure(&staged).await?;
        info!(
            track_id = %session.track().id,
            meter = self.capabilities.meter.name(),
            "{}",
            measurement
        );
        session.measurement = Some(measurement);
        Ok(())
    }

    async fn apply_gain(&mut self, session: &mut TrackSession) -> Result<()> {
        let measurement = session.measurement.ok_or_else(|| {
            PlaybackError::ConversionFailure("no loudness measurement".to_string())
        })?;
        let decision = self.policy.decide(&measurement, &self.chain)?;
        info!(track_id = %session.track().id, "Gain: {}", decision);

        if self.source.volume_control == VolumeControl::Analog
            && self.mixer.needs_write(decision.analog_gain_db)
        {
            match self
                .capabilities
                .mixer
                .set_gain(
                    self.source.card,
                    &self.source.mixer_control,
                    decision.analog_gain_db,
                )
                .await
            {
                Ok(()) => self.mixer.record(decision.analog_gain_db),
                Err(e) => {
                    let error = PlaybackError::HardwareControlFailure(e.to_string());
                    warn!(
                        track_id = %session.track().id,
                        previous_db = ?self.mixer.applied(),
                        error = %error,
                        "Keeping previous hardware gain"
                    );
                }
            }
        }

        let staged = session
            .buffer
            .clone()
            .ok_or_else(|| PlaybackError::ConversionFailure("no staged buffer".to_string()))?;
        let output = session.working_file("final", "wav");
        self.capabilities
            .resampler
            .convert(&Conversion {
                input: &staged,
                output: &output,
                gain_db: decision.digital_gain_db,
                sample_rate_hz: None,
                bit_depth: self.source.bit_depth(),
            })
            .await
            .map_err(|e| PlaybackError::ConversionFailure(e.to_string()))?;

        session.buffer = Some(output);
        session.decision = Some(decision);
        Ok(())
    }

    async fn play(&self, session: &mut TrackSession) -> Result<()> {
        let path = session
            .buffer
            .clone()
            .ok_or_else(|| PlaybackError::PlaybackFailure("no final buffer".to_string()))?;
        self.capabilities
            .player
            .play(&PlayRequest {
                device: &self.source.device,
                format: self.source.sample_format,
                sample_rate_hz: self.source.sample_rate_hz(),
                path: &path,
            })
            .await
            .map_err(|e| PlaybackError::PlaybackFailure(e.to_string()))
    }

    async fn prepare(&self) -> Result<()> {
        let purged = self.workdir.prepare().await?;
        debug!(dir = %self.workdir.root().display(), purged, "Working directory ready");
        Ok(())
    }
}
