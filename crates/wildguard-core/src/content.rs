//! Content lookup seam.
//!
//! The simulation never hardcodes creature or enemy stats; it asks a
//! [`ContentLookup`] for numeric templates keyed by tier or kind.

use serde::{Deserialize, Serialize};

use crate::components::CreatureStats;
use crate::enums::{EnemyKind, RarityTier};

/// Base stats for wild creatures of one rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreatureTemplate {
    pub tier: RarityTier,
    /// Stats before the tier coefficient and instance variance.
    pub base: CreatureStats,
    /// Multiplier applied to every base stat. Strictly increasing in tier.
    pub stat_coefficient: f64,
    /// Penalty subtracted from the capture probability.
    pub capture_difficulty: f64,
}

/// Stats for one enemy kind, before the wave difficulty multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub kind: EnemyKind,
    pub max_health: f64,
    pub speed: f64,
    pub damage: f64,
    pub reward_coins: u64,
    pub reward_souls: f64,
}

/// Numeric content provider consumed by the simulation.
pub trait ContentLookup: Send + Sync {
    fn creature_template(&self, tier: RarityTier) -> CreatureTemplate;

    fn enemy_profile(&self, wave_index: u32, kind: EnemyKind) -> EnemyProfile;
}
