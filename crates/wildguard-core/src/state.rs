//! Session snapshot: the complete visible state handed to the presentation layer each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{EnemyId, Position, SimTime, UnitId, WildId};

/// Complete session state returned after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub phase: PhaseState,
    /// Countdown of the current phase, if it has one.
    pub phase_time_remaining: Option<f64>,
    pub wallet: WalletView,
    pub wild: Vec<WildView>,
    pub roster: Vec<UnitView>,
    pub battle: BattleView,
    /// Events raised since the previous snapshot, oldest first.
    pub events: Vec<SimEvent>,
}

/// Ledger balances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletView {
    pub coins: u64,
    pub gems: u64,
    pub souls: f64,
    pub eggs: u32,
    pub materials: u32,
}

/// A wild creature on the capture field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildView {
    pub id: WildId,
    pub tier: RarityTier,
    pub position: Position,
    pub health: f64,
    pub max_health: f64,
    pub capturable: bool,
    pub despawn_in_secs: f64,
}

/// A captured creature in the roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitView {
    pub unit: UnitId,
    pub tier: RarityTier,
    pub level: u32,
    pub attack: f64,
}

/// Defense-phase state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleView {
    pub state: BattleState,
    pub wave_index: u32,
    pub final_wave: u32,
    pub difficulty: f64,
    pub objective_health: f64,
    pub objective_max_health: f64,
    pub enemies_pending: u32,
    pub enemies: Vec<EnemyView>,
}

/// An active enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Position,
    pub health: f64,
    pub max_health: f64,
    pub remaining_distance: f64,
}
