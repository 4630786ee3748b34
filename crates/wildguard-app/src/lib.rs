//! WILDGUARD headless runner.
//!
//! Wires the session engine to a game-loop thread, shared state for
//! snapshot polling and a scripted autoplay player.

pub mod autoplay;
pub mod game_loop;
pub mod state;

pub use wildguard_core as core;
