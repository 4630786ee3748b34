//! Wave composition: scaling law and enemy kind selection.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::warn;

use wildguard_core::config::SessionConfig;
use wildguard_core::constants::{BOSS_WAVE_PERIOD, BRUTE_FIRST_WAVE, RUNNER_FIRST_WAVE};
use wildguard_core::enums::EnemyKind;

/// Kinds eligible for the weighted draw (bosses are placed by rule only).
const WEIGHTED_KINDS: [EnemyKind; 4] = [
    EnemyKind::Grunt,
    EnemyKind::Runner,
    EnemyKind::Brute,
    EnemyKind::Elite,
];

/// A fully composed wave, ready to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveDefinition {
    pub wave_index: u32,
    pub enemy_count: u32,
    /// Cumulative difficulty multiplier applied to enemy health and damage.
    pub difficulty: f64,
    /// Seconds between enemy spawns.
    pub spawn_interval: f64,
    /// Spawn order, one entry per enemy.
    pub kinds: Vec<EnemyKind>,
}

/// `base_count + (wave_index - 1) * increment`.
pub fn enemy_count(config: &SessionConfig, wave_index: u32) -> u32 {
    config.wave_base_count.saturating_add(
        wave_index
            .saturating_sub(1)
            .saturating_mul(config.wave_count_increment),
    )
}

/// `1 + (wave_index - 1) * difficulty_rate`.
pub fn difficulty_multiplier(config: &SessionConfig, wave_index: u32) -> f64 {
    1.0 + f64::from(wave_index.saturating_sub(1)) * config.difficulty_rate
}

/// Weights for grunt, runner, brute and elite in a weighted wave.
/// Shift toward stronger kinds as the wave index grows past the cutoff.
pub fn kind_weights(wave_index: u32, weighted_from_wave: u32) -> [u32; 4] {
    let k = wave_index.saturating_sub(weighted_from_wave);
    [
        50u32.saturating_sub(k.saturating_mul(4)).max(10),
        25,
        15u32.saturating_add(k.saturating_mul(2)),
        5u32.saturating_add(k.saturating_mul(3)),
    ]
}

/// Fixed slot rules used below the weighted cutoff.
pub fn deterministic_kind(wave_index: u32, slot: u32) -> EnemyKind {
    if wave_index >= BRUTE_FIRST_WAVE && slot % 4 == 3 {
        EnemyKind::Brute
    } else if wave_index >= RUNNER_FIRST_WAVE && slot % 3 == 2 {
        EnemyKind::Runner
    } else {
        EnemyKind::Grunt
    }
}

pub fn is_boss_slot(wave_index: u32, slot: u32) -> bool {
    slot == 0 && wave_index > 0 && wave_index % BOSS_WAVE_PERIOD == 0
}

/// Compose wave `wave_index` (1-based).
pub fn compose_wave<R: Rng + ?Sized>(
    config: &SessionConfig,
    wave_index: u32,
    rng: &mut R,
) -> WaveDefinition {
    let count = enemy_count(config, wave_index);
    let weighted = wave_index >= config.weighted_composition_from_wave;

    let distribution = if weighted {
        match WeightedIndex::new(kind_weights(wave_index, config.weighted_composition_from_wave)) {
            Ok(dist) => Some(dist),
            Err(err) => {
                warn!(wave_index, %err, "kind weights rejected, using fixed composition");
                None
            }
        }
    } else {
        None
    };

    let kinds = (0..count)
        .map(|slot| {
            if is_boss_slot(wave_index, slot) {
                EnemyKind::Boss
            } else if let Some(dist) = &distribution {
                WEIGHTED_KINDS[dist.sample(rng)]
            } else {
                deterministic_kind(wave_index, slot)
            }
        })
        .collect();

    WaveDefinition {
        wave_index,
        enemy_count: count,
        difficulty: difficulty_multiplier(config, wave_index),
        spawn_interval: config.enemy_spawn_interval,
        kinds,
    }
}
