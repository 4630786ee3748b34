//! Application state shared between the driver and the game loop thread.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use thiserror::Error;

use wildguard_core::commands::SessionCommand;
use wildguard_core::state::SessionSnapshot;
use wildguard_sim::SessionEngine;

use crate::game_loop::{self, LoopPacing};

/// Commands sent from the driver to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A command to forward to the session engine.
    Session(SessionCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

#[derive(Debug, Error)]
pub enum LoopError {
    #[error("game loop already running")]
    AlreadyRunning,
    #[error("game loop not started")]
    NotStarted,
    #[error("game loop has stopped")]
    Disconnected,
    #[error("shared state lock poisoned")]
    Poisoned,
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Shared application state.
///
/// - `mpsc::Sender` is wrapped in `Mutex` (Sender is Send but not Sync)
/// - the latest snapshot is an `Arc<Mutex<...>>` shared with the loop thread
pub struct AppState {
    /// `None` before `start` is called.
    pub command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    /// Updated by the game loop thread after each tick.
    pub latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            handle: Mutex::new(None),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the engine to a new game loop thread.
    pub fn start(&self, engine: SessionEngine, pacing: LoopPacing) -> Result<(), LoopError> {
        let mut handle = self.handle.lock().map_err(|_| LoopError::Poisoned)?;
        if handle.is_some() {
            return Err(LoopError::AlreadyRunning);
        }
        let (cmd_tx, join) =
            game_loop::spawn_game_loop(engine, pacing, self.latest_snapshot.clone())?;
        *self.command_tx.lock().map_err(|_| LoopError::Poisoned)? = Some(cmd_tx);
        *handle = Some(join);
        Ok(())
    }

    pub fn send(&self, command: SessionCommand) -> Result<(), LoopError> {
        let tx = self.command_tx.lock().map_err(|_| LoopError::Poisoned)?;
        match tx.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::Session(command))
                .map_err(|_| LoopError::Disconnected),
            None => Err(LoopError::NotStarted),
        }
    }

    pub fn snapshot(&self) -> Result<Option<SessionSnapshot>, LoopError> {
        let lock = self.latest_snapshot.lock().map_err(|_| LoopError::Poisoned)?;
        Ok(lock.clone())
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().map(|h| h.is_some()).unwrap_or(false)
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(&self) -> Result<(), LoopError> {
        if let Some(tx) = self
            .command_tx
            .lock()
            .map_err(|_| LoopError::Poisoned)?
            .take()
        {
            // The loop may already be gone; joining below covers both cases.
            let _ = tx.send(GameLoopCommand::Shutdown);
        }
        let join = self.handle.lock().map_err(|_| LoopError::Poisoned)?.take();
        match join {
            Some(join) => join.join().map_err(|_| LoopError::Disconnected),
            None => Err(LoopError::NotStarted),
        }
    }
}
