/// levelplay - Level-matched catalog playback
use clap::Parser;
use levelplay_cli::{app, AppConfig};
use levelplay_core::CollectionRef;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "levelplay")]
#[command(
    about = "Play a catalog collection at a fixed acoustic level",
    long_about = "Play a catalog collection at a fixed acoustic level.\n\n\
                  REFERENCE is kind/id, e.g. album/58990510, playlist/<uuid>, artist/7, \
                  artist-radio/7, track-radio/9 or track/9. Without it, favorites are \
                  played in random order until interrupted."
)]
struct Cli {
    /// Collection to play; omit for endless random favorites
    reference: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "levelplay=info,levelplay_cli=info,levelplay_playback=info,\
                 levelplay_loudness=info,levelplay_catalog=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let reference = CollectionRef::parse(cli.reference.as_deref().unwrap_or_default())?;

    let config = AppConfig::load()?;
    config.validate()?;

    match app::run(&config, &reference).await {
        Ok(report) => {
            info!(
                played = report.played_count(),
                skipped = report.skipped_count(),
                "Session finished: {}",
                report
            );
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}
