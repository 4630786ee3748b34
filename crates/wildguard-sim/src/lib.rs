//! Simulation for WILDGUARD.
//!
//! Runs a session as a tick-driven state machine: a capture phase over a
//! registry of wild creatures, then a defense phase of escalating enemy waves
//! fought by the captured roster. Produces `SessionSnapshot`s for the
//! presentation layer.

pub mod battle;
pub mod capture;
pub mod engine;
pub mod registry;
pub mod roster;
pub mod systems;
pub mod wave;

pub use wildguard_core as core;
pub use engine::SessionEngine;

#[cfg(test)]
mod tests;
