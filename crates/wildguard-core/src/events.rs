//! Outcome events emitted by the simulation for the presentation layer.
//!
//! Events are appended to a queue during a tick and drained into the
//! snapshot that tick returns. They are fire-and-forget: nothing in the
//! simulation waits on a consumer.

use serde::{Deserialize, Serialize};

use crate::economy::DropSet;
use crate::enums::*;
use crate::types::{EnemyId, Position, UnitId, WildId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    PhaseChanged {
        from: PhaseState,
        to: PhaseState,
    },

    // --- Capture phase ---
    WildSpawned {
        id: WildId,
        tier: RarityTier,
        position: Position,
    },
    /// Health crossed the capturable threshold.
    WildBecameCapturable { id: WildId },
    WildCaptured {
        id: WildId,
        unit: UnitId,
        chance: f64,
        drops: DropSet,
    },
    /// Capture roll failed and the creature fled.
    WildEscaped { id: WildId, chance: f64 },
    /// Capture roll failed; the creature stays for another attempt.
    WildResisted { id: WildId, chance: f64 },
    WildKilled { id: WildId, drops: DropSet },
    WildDespawned { id: WildId },

    // --- Defense phase ---
    WaveStarted {
        wave_index: u32,
        enemy_count: u32,
        difficulty: f64,
    },
    EnemySpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    EnemyDefeated {
        id: EnemyId,
        coins: u64,
        souls: f64,
    },
    ObjectiveHealthChanged {
        health: f64,
        max_health: f64,
    },
    WaveCompleted {
        wave_index: u32,
        bonus_coins: u64,
    },

    // --- Session ---
    SessionVictory { waves_cleared: u32 },
    SessionDefeat { reason: DefeatReason },
    /// A queued command could not be applied.
    CommandRejected { reason: String },
}
