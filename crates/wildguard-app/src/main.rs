use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

use wildguard_app::autoplay::Autoplay;
use wildguard_app::game_loop::{log_events, LoopPacing};
use wildguard_app::state::{AppState, LoopError};
use wildguard_core::config::{ConfigError, SessionConfig};
use wildguard_core::state::SessionSnapshot;
use wildguard_sim::SessionEngine;

/// Run a WILDGUARD session headlessly with a scripted player.
#[derive(Parser, Debug)]
#[command(name = "wildguard", version, about)]
struct Args {
    /// Session config JSON; missing fields use defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the config's RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of ticks to run.
    #[arg(long, default_value_t = 20_000)]
    ticks: u64,

    /// Simulated seconds per tick.
    #[arg(long, default_value_t = 0.1)]
    dt: f64,

    /// Run the engine on the game loop thread at wall-clock pace.
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loop(#[from] LoopError),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("--dt must be positive and finite, got {0}")]
    InvalidDt(f64),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, RunError> {
    if !args.dt.is_finite() || args.dt <= 0.0 {
        return Err(RunError::InvalidDt(args.dt));
    }

    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    info!(seed = config.seed, ticks = args.ticks, dt = args.dt, "starting run");

    let autoplay = Autoplay::new(config.costs.clone());
    let engine = SessionEngine::new(config)?;

    let snapshot = if args.realtime {
        run_realtime(engine, autoplay, args)?
    } else {
        run_headless(engine, autoplay, args)
    };
    info!(
        phase = %snapshot.phase,
        coins = snapshot.wallet.coins,
        gems = snapshot.wallet.gems,
        "run finished"
    );
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Drive the engine directly on this thread; fully deterministic.
fn run_headless(mut engine: SessionEngine, mut autoplay: Autoplay, args: &Args) -> SessionSnapshot {
    let mut snapshot = SessionSnapshot::default();
    for _ in 0..args.ticks {
        engine.queue_commands(autoplay.plan(&snapshot));
        snapshot = engine.tick(args.dt);
        log_events(&snapshot.events);
        if autoplay.is_done(&snapshot) {
            break;
        }
    }
    snapshot
}

/// Hand the engine to the game loop thread and poll its snapshots.
fn run_realtime(
    engine: SessionEngine,
    mut autoplay: Autoplay,
    args: &Args,
) -> Result<SessionSnapshot, RunError> {
    let pacing = LoopPacing {
        dt: args.dt,
        realtime: true,
    };
    let state = AppState::new();
    state.start(engine, pacing)?;

    let poll = pacing.tick_duration().max(Duration::from_millis(1));
    let mut last_seen = None;
    let mut snapshot = SessionSnapshot::default();
    for _ in 0..args.ticks {
        std::thread::sleep(poll);
        let Some(latest) = state.snapshot()? else {
            continue;
        };
        // Answer each tick once.
        let key = (latest.time.tick, latest.phase);
        if last_seen == Some(key) {
            continue;
        }
        last_seen = Some(key);
        snapshot = latest;

        for command in autoplay.plan(&snapshot) {
            state.send(command)?;
        }
        if autoplay.is_done(&snapshot) {
            break;
        }
    }
    state.shutdown()?;
    Ok(snapshot)
}
