//! Tier-specific creature templates.

use wildguard_core::components::CreatureStats;
use wildguard_core::content::CreatureTemplate;
use wildguard_core::enums::RarityTier;

/// Stat multiplier per tier, lowest first. Strictly increasing.
pub const TIER_STAT_COEFFICIENTS: [f64; 5] = [1.0, 1.3, 1.7, 2.2, 3.0];

/// Capture penalty per tier step.
pub const CAPTURE_DIFFICULTY_PER_TIER: f64 = 0.1;

/// Shared base stats; tiers differ by coefficient and special attributes.
const BASE_STATS: CreatureStats = CreatureStats {
    attack: 10.0,
    defense: 5.0,
    speed: 20.0,
    max_health: 100.0,
    divine_power: 0.0,
    absorption_rate: 0.0,
};

/// Get the template for a given tier.
pub fn get_template(tier: RarityTier) -> CreatureTemplate {
    let index = tier.index();
    let base = match tier {
        RarityTier::Common | RarityTier::Uncommon => BASE_STATS,
        RarityTier::Rare => CreatureStats {
            divine_power: 5.0,
            absorption_rate: 0.02,
            ..BASE_STATS
        },
        RarityTier::Epic => CreatureStats {
            divine_power: 10.0,
            absorption_rate: 0.05,
            ..BASE_STATS
        },
        // Legendaries trade a little speed for the strongest specials.
        RarityTier::Legendary => CreatureStats {
            speed: 18.0,
            divine_power: 20.0,
            absorption_rate: 0.1,
            ..BASE_STATS
        },
    };

    CreatureTemplate {
        tier,
        base,
        stat_coefficient: TIER_STAT_COEFFICIENTS[index],
        capture_difficulty: index as f64 * CAPTURE_DIFFICULTY_PER_TIER,
    }
}
