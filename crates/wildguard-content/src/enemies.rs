//! Kind-specific enemy profiles.
//!
//! Values are before the wave difficulty multiplier, which the battle engine
//! applies to health and contact damage.

use wildguard_core::constants::BOSS_WAVE_PERIOD;
use wildguard_core::content::EnemyProfile;
use wildguard_core::enums::EnemyKind;

/// Extra boss health per milestone already passed.
pub const BOSS_HEALTH_PER_MILESTONE: f64 = 0.5;

/// Get the profile for an enemy kind in a given wave.
pub fn get_profile(wave_index: u32, kind: EnemyKind) -> EnemyProfile {
    match kind {
        EnemyKind::Grunt => EnemyProfile {
            kind,
            max_health: 30.0,
            speed: 6.0,
            damage: 20.0,
            reward_coins: 5,
            reward_souls: 0.1,
        },
        EnemyKind::Runner => EnemyProfile {
            kind,
            max_health: 18.0,
            speed: 11.0,
            damage: 12.0,
            reward_coins: 6,
            reward_souls: 0.1,
        },
        EnemyKind::Brute => EnemyProfile {
            kind,
            max_health: 80.0,
            speed: 3.5,
            damage: 45.0,
            reward_coins: 12,
            reward_souls: 0.25,
        },
        EnemyKind::Elite => EnemyProfile {
            kind,
            max_health: 120.0,
            speed: 5.0,
            damage: 60.0,
            reward_coins: 20,
            reward_souls: 0.5,
        },
        EnemyKind::Boss => {
            let milestones_passed = (wave_index / BOSS_WAVE_PERIOD).saturating_sub(1);
            EnemyProfile {
                kind,
                max_health: 400.0 * (1.0 + milestones_passed as f64 * BOSS_HEALTH_PER_MILESTONE),
                speed: 2.5,
                damage: 150.0,
                reward_coins: 100,
                reward_souls: 3.0,
            }
        }
    }
}
