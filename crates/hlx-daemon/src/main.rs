//! Headless engine process: loads configuration and an optional track
//! snapshot, then drives the tick loop at `frameRateHz` until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use hlx_core::{EngineConfig, Track};
use hlx_engine::{Endpoints, Engine};

#[derive(Parser)]
#[command(name = "hlx-daemon", about = "Holophonix animation engine daemon")]
struct Cli {
    /// TOML configuration file; defaults to the built-in reference config.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON track snapshot `{ "tracks": [...] }`; empty if omitted.
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Outbound OSC endpoint (the Holophonix processor).
    #[arg(long, default_value = "127.0.0.1:4003")]
    outbound: SocketAddr,

    /// Local address to bind for inbound OSC.
    #[arg(long, default_value = "0.0.0.0:4004")]
    inbound_bind: SocketAddr,

    /// Run device discovery once at startup before entering the tick loop.
    #[arg(long)]
    discover: bool,
}

#[derive(serde::Deserialize, Default)]
struct ProjectSnapshot {
    #[serde(default)]
    tracks: Vec<Track>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_toml_str(&raw).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    let project = match &cli.project {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading project {}", path.display()))?;
            serde_json::from_str::<ProjectSnapshot>(&raw)
                .with_context(|| format!("parsing project {}", path.display()))?
        }
        None => ProjectSnapshot::default(),
    };

    log::info!("starting engine: {} track(s), outbound {}", project.tracks.len(), cli.outbound);

    let mut engine = Engine::new(config, project.tracks, Endpoints { outbound: cli.outbound, inbound_bind: cli.inbound_bind })
        .await
        .context("engine initialisation failed")?;

    if cli.discover {
        match engine.discover().await {
            Ok(count) => log::info!("discovery probed up to index {count}"),
            Err(e) => log::warn!("discovery failed: {e}"),
        }
    }

    engine.spawn_liveness(|availability| {
        log::info!("device availability changed: {availability:?}");
    });

    let events = engine.subscribe();
    std::thread::spawn(move || {
        while let Ok(event) = events.recv() {
            log::debug!("event: {event:?}");
        }
    });

    let tick_interval = Duration::from_secs_f64(1.0 / config.frame_rate_hz as f64);
    let mut ticker = tokio::time::interval(tick_interval);

    log::info!("entering tick loop at {} Hz", config.frame_rate_hz);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let telemetry = engine.tick(Instant::now());
                log::trace!(
                    "tick: {} -> {} messages ({:.1}% reduction)",
                    telemetry.original_count, telemetry.optimised_count, telemetry.reduction_pct
                );
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutdown requested");
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
