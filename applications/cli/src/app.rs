//! Session wiring
//!
//! Turns an [`AppConfig`] into a catalog client, a capability set and an
//! orchestrator, then plays one collection reference.

use crate::config::{AppConfig, LoudnessBackend};
use anyhow::Context;
use levelplay_catalog::CatalogClient;
use levelplay_core::{CollectionRef, ExternalTool};
use levelplay_loudness::{Ebur128Meter, FfmpegLoudnorm, LoudnessMeter};
use levelplay_playback::{
    AlsaMixer, AplayPlayer, Capabilities, CommandUnfolder, FfmpegDecoder, Orchestrator,
    SessionReport, SoxResampler, Unfolder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the subprocess-backed capability set
pub fn build_capabilities(config: &AppConfig) -> Capabilities {
    let tools = &config.tools;
    let fetch = Duration::from_secs(config.timeouts.fetch_secs);
    let process = Duration::from_secs(config.timeouts.process_secs);
    let playback = Duration::from_secs(config.timeouts.playback_secs);

    let meter: Arc<dyn LoudnessMeter> = match config.loudness.backend {
        LoudnessBackend::Ffmpeg => Arc::new(
            FfmpegLoudnorm::new(
                ExternalTool::new("ffmpeg", &tools.ffmpeg, process),
                config.loudness_target(),
            )
            .with_tail_lines(config.loudness.tail_lines),
        ),
        LoudnessBackend::Ebur128 => Arc::new(Ebur128Meter::new(config.loudness_target())),
    };

    let unfolder = tools.unfold_decoder.as_ref().map(|program| {
        Arc::new(CommandUnfolder::new(ExternalTool::new(
            "unfold", program, process,
        ))) as Arc<dyn Unfolder>
    });

    Capabilities {
        decoder: Arc::new(FfmpegDecoder::new(ExternalTool::new(
            "ffmpeg",
            &tools.ffmpeg,
            fetch,
        ))),
        unfolder,
        resampler: Arc::new(SoxResampler::new(ExternalTool::new(
            "sox", &tools.sox, process,
        ))),
        meter,
        mixer: Arc::new(AlsaMixer::new(ExternalTool::new(
            "amixer",
            &tools.amixer,
            process,
        ))),
        player: Arc::new(AplayPlayer::new(ExternalTool::new(
            "aplay",
            &tools.aplay,
            playback,
        ))),
    }
}

/// Build an orchestrator for the configured device pair
pub fn build_orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let devices = config.devices();
    let (source, sink) = devices
        .pair(&config.session.source, &config.session.sink)
        .context("Failed to select playback devices")?;

    let client =
        CatalogClient::new(config.catalog_config()).context("Failed to create catalog client")?;
    info!(url = %client.url(), authenticated = client.is_authenticated(), "Catalog client ready");

    let orchestrator = Orchestrator::new(
        Arc::new(client),
        build_capabilities(config),
        source.clone(),
        sink,
        config.playback_config()?,
    )
    .context("Failed to build playback chain")?;

    Ok(orchestrator)
}

/// Play `reference` to completion (or forever, for favorites without a cap)
pub async fn run(config: &AppConfig, reference: &CollectionRef) -> anyhow::Result<SessionReport> {
    info!(
        source = %config.session.source,
        sink = %config.session.sink,
        reference = %reference,
        "Starting session"
    );

    let mut orchestrator = build_orchestrator(config)?;
    let report = orchestrator
        .run(reference)
        .await
        .with_context(|| format!("Session for {} ended", reference))?;

    Ok(report)
}
