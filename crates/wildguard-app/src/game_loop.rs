//! Game loop thread: runs the session engine and publishes snapshots.
//!
//! The engine moves into this thread. Commands arrive via an `mpsc` channel;
//! snapshots are stored in shared state for polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use wildguard_core::enums::PhaseState;
use wildguard_core::events::SimEvent;
use wildguard_core::state::SessionSnapshot;
use wildguard_sim::SessionEngine;

use crate::state::GameLoopCommand;

/// How the loop advances the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopPacing {
    /// Simulated seconds per tick.
    pub dt: f64,
    /// Sleep so one tick takes `dt` of wall-clock time. Without it the loop
    /// ticks back to back and only yields while the session is frozen.
    pub realtime: bool,
}

impl LoopPacing {
    pub fn tick_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.dt).unwrap_or(Duration::ZERO)
    }

    /// Whether an unpaced loop should give up its time slice in `phase`.
    pub fn yields_in(&self, phase: PhaseState) -> bool {
        !self.realtime && !phase.is_simulating()
    }
}

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    engine: SessionEngine,
    pacing: LoopPacing,
    latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("wildguard-game-loop".into())
        .spawn(move || {
            run_game_loop(engine, pacing, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    mut engine: SessionEngine,
    pacing: LoopPacing,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<SessionSnapshot>>,
) {
    let tick_duration = pacing.tick_duration();
    let mut next_tick_time = Instant::now();
    info!(dt = pacing.dt, realtime = pacing.realtime, "game loop started");

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(GameLoopCommand::Session(cmd)) => engine.queue_command(cmd),
                Ok(GameLoopCommand::Shutdown) | Err(mpsc::TryRecvError::Disconnected) => {
                    info!(tick = engine.time().tick, "game loop stopped");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }

        // 2. Advance one tick (the engine freezes itself outside active phases)
        let snapshot = engine.tick(pacing.dt);
        log_events(&snapshot.events);

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        if !pacing.realtime {
            if pacing.yields_in(engine.current_phase()) {
                std::thread::yield_now();
            }
            continue;
        }

        // 4. Sleep until next tick
        next_tick_time += tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > tick_duration * 2 {
            // Too far behind, reset the schedule
            next_tick_time = now;
        }
    }
}

/// Log a tick's events at a level matching their weight.
pub fn log_events(events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::PhaseChanged { .. }
            | SimEvent::WaveStarted { .. }
            | SimEvent::WaveCompleted { .. }
            | SimEvent::SessionVictory { .. }
            | SimEvent::SessionDefeat { .. }
            | SimEvent::WildCaptured { .. } => info!(?event, "event"),
            SimEvent::CommandRejected { reason } => warn!(%reason, "command rejected"),
            _ => debug!(?event, "event"),
        }
    }
}
