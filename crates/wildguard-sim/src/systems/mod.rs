//! Per-step systems over the battle world.
//!
//! Systems are free functions over `&mut World` (or `&World` when read-only).
//! They own no state; results are collected into caller buffers.

pub mod defenders;
pub mod movement;
pub mod snapshot;
