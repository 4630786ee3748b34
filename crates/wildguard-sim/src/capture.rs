//! Capture probability and drop tables.
//!
//! Pure functions over plain data; the registry decides when to call them.

use rand::Rng;

use wildguard_core::constants::*;
use wildguard_core::economy::DropSet;
use wildguard_core::enums::RarityTier;

/// Capture bonus granted by an assisting roster unit of the given level.
pub fn assist_bonus(assist_level: Option<u32>) -> f64 {
    assist_level.map_or(0.0, |level| f64::from(level) * ASSIST_BONUS_PER_LEVEL)
}

/// Probability that a capture attempt succeeds.
///
/// `base_rate + (1 - health_ratio) * 0.4 - capture_difficulty + assist_bonus`,
/// clamped to `[0.05, 0.95]`.
pub fn capture_chance(
    base_rate: f64,
    health_ratio: f64,
    capture_difficulty: f64,
    assist_level: Option<u32>,
) -> f64 {
    let weakness = 1.0 - health_ratio.clamp(0.0, 1.0);
    let raw = base_rate + weakness * CAPTURE_WEAKNESS_WEIGHT - capture_difficulty
        + assist_bonus(assist_level);
    raw.clamp(CAPTURE_CHANCE_MIN, CAPTURE_CHANCE_MAX)
}

/// Full drop set for a successful capture.
pub fn roll_capture_drops<R: Rng + ?Sized>(tier: RarityTier, rng: &mut R) -> DropSet {
    let t = tier.index();
    let tf = t as f64;

    let coins = rng.gen_range(CAPTURE_COINS_MIN..=CAPTURE_COINS_MAX) + CAPTURE_COINS_PER_TIER * t as u64;

    let souls = if rng.gen_bool(chance(CAPTURE_SOUL_CHANCE_BASE + CAPTURE_SOUL_CHANCE_PER_TIER * tf)) {
        tf + 1.0
    } else {
        0.0
    };

    let eggs = u32::from(rng.gen_bool(chance(
        CAPTURE_EGG_CHANCE_BASE + CAPTURE_EGG_CHANCE_PER_TIER * tf,
    )));

    let materials = if rng.gen_bool(chance(
        CAPTURE_MATERIAL_CHANCE_BASE + CAPTURE_MATERIAL_CHANCE_PER_TIER * tf,
    )) {
        rng.gen_range(CAPTURE_MATERIALS_MIN..=CAPTURE_MATERIALS_MAX)
    } else {
        0
    };

    DropSet {
        coins,
        souls,
        eggs,
        materials,
    }
}

/// Reduced drop set for a creature killed before capture. Never eggs or materials.
pub fn roll_death_drops<R: Rng + ?Sized>(tier: RarityTier, rng: &mut R) -> DropSet {
    let tf = tier.index() as f64;

    let coins = rng.gen_range(DEATH_COINS_MIN..=DEATH_COINS_MAX);
    let souls = if rng.gen_bool(chance(DEATH_SOUL_CHANCE_BASE + DEATH_SOUL_CHANCE_PER_TIER * tf)) {
        (tf + 1.0) * DEATH_SOUL_AMOUNT_FACTOR
    } else {
        0.0
    };

    DropSet {
        coins,
        souls,
        eggs: 0,
        materials: 0,
    }
}

/// `gen_bool` panics outside `[0, 1]`.
fn chance(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}
