//! Player commands sent from the presentation layer to the simulation.
//!
//! Commands are queued and applied at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::PhaseState;
use crate::types::{EnemyId, UnitId, WildId};

/// Purchasable shop actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item")]
pub enum ShopItem {
    /// Restore objective health; only during a paused defense phase.
    RepairObjective { hp: u32 },
    /// Raise a roster unit's level by one.
    UpgradeUnit { unit: UnitId },
}

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionCommand {
    // --- Session control ---
    /// Start a fresh session from the main menu or game over screen.
    StartSession,
    Pause,
    Resume,
    /// Request an explicit phase transition.
    ForceTransition { target: PhaseState },

    // --- Capture phase ---
    DamageWild { id: WildId, amount: f64 },
    AttemptCapture {
        id: WildId,
        assist: Option<UnitId>,
    },

    // --- Defense phase ---
    DamageEnemy { id: EnemyId, amount: f64 },
    /// Skip the remaining setup / inter-wave countdown.
    CallNextWave,

    // --- Shop ---
    Purchase { item: ShopItem },
}
