//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in the sim crate, not in components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EnemyId, UnitId, WildId};

/// Combat stats of a creature instance (wild or captured).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatureStats {
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub max_health: f64,
    /// "Divine" special power.
    pub divine_power: f64,
    /// Fraction of dealt damage converted to self-healing.
    pub absorption_rate: f64,
}

/// Hit points. Invariant: `0 <= current <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// A capturable creature roaming the capture area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WildCreature {
    pub id: WildId,
    pub tier: RarityTier,
    pub stats: CreatureStats,
    /// Tier penalty subtracted from the capture probability.
    pub capture_difficulty: f64,
    /// Latched once health drops to the capturable threshold.
    pub capturable: bool,
}

/// Seconds left before a wild creature wanders off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DespawnTimer {
    pub remaining_secs: f64,
}

/// An attacker walking toward the objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    /// Distance units per second.
    pub speed: f64,
    /// Contact damage before the wave difficulty multiplier.
    pub damage: f64,
    /// Distance left to the objective.
    pub remaining_distance: f64,
    /// Unit direction from the objective toward the enemy's spawn point.
    pub heading: glam::DVec2,
    pub reward_coins: u64,
    pub reward_souls: f64,
}

/// A roster unit deployed around the objective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defender {
    pub unit: UnitId,
    pub attack: f64,
    pub range: f64,
    /// Seconds between strikes.
    pub attack_interval: f64,
    /// Seconds until the next strike is allowed.
    pub cooldown_secs: f64,
}

/// A captured creature owned by the player for the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCreature {
    pub unit: UnitId,
    /// Wild id the creature had before capture.
    pub origin: WildId,
    pub tier: RarityTier,
    pub stats: CreatureStats,
    pub level: u32,
}
