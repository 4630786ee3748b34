//! Defender targeting system.
//!
//! Each deployed roster unit counts down its cooldown and, when ready,
//! strikes the in-range enemy closest to the objective. Strikes are
//! collected rather than applied so the battle engine owns every kill.

use hecs::World;

use wildguard_core::components::{CapturedCreature, CreatureStats, Defender, Enemy, Health};
use wildguard_core::constants::{
    DEFENDER_ATTACK_PER_LEVEL, DEFENDER_BASE_ATTACK_INTERVAL, DEFENDER_BASE_RANGE,
    DEFENDER_RANGE_PER_TIER,
};
use wildguard_core::enums::RarityTier;
use wildguard_core::types::{EnemyId, Position};

/// Damage dealt by one strike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub enemy: EnemyId,
    pub damage: f64,
}

/// Strike damage of a roster unit at its current level.
pub fn defender_attack(unit: &CapturedCreature) -> f64 {
    let bonus = f64::from(unit.level.saturating_sub(1)) * DEFENDER_ATTACK_PER_LEVEL;
    unit.stats.attack.max(0.0) * (1.0 + bonus)
}

pub fn defender_range(tier: RarityTier) -> f64 {
    DEFENDER_BASE_RANGE + DEFENDER_RANGE_PER_TIER * tier.index() as f64
}

/// Faster creatures strike more often.
pub fn attack_interval(stats: &CreatureStats) -> f64 {
    DEFENDER_BASE_ATTACK_INTERVAL / (1.0 + stats.speed.max(0.0) / 50.0)
}

/// Defender component for a roster unit, ready to strike immediately.
pub fn defender_for(unit: &CapturedCreature) -> Defender {
    Defender {
        unit: unit.unit,
        attack: defender_attack(unit),
        range: defender_range(unit.tier),
        attack_interval: attack_interval(&unit.stats),
        cooldown_secs: 0.0,
    }
}

struct Target {
    id: EnemyId,
    position: Position,
    health: f64,
    remaining_distance: f64,
}

/// Advance defender cooldowns and collect this step's strikes.
pub fn run(world: &mut World, dt: f64, strikes: &mut Vec<Strike>) {
    let mut targets: Vec<Target> = world
        .query::<(&Enemy, &Health, &Position)>()
        .iter()
        .map(|(_, (enemy, health, pos))| Target {
            id: enemy.id,
            position: *pos,
            health: health.current,
            remaining_distance: enemy.remaining_distance,
        })
        .collect();
    targets.sort_by(|a, b| {
        a.remaining_distance
            .total_cmp(&b.remaining_distance)
            .then(a.id.cmp(&b.id))
    });

    for (_entity, (defender, pos)) in world.query_mut::<(&mut Defender, &Position)>() {
        defender.cooldown_secs = (defender.cooldown_secs - dt).max(0.0);
        if defender.cooldown_secs > 0.0 {
            continue;
        }
        // Skip enemies already doomed by earlier strikes this step.
        let Some(target) = targets
            .iter_mut()
            .find(|t| t.health > 0.0 && t.position.distance(*pos) <= defender.range)
        else {
            continue;
        };
        target.health -= defender.attack;
        strikes.push(Strike {
            enemy: target.id,
            damage: defender.attack,
        });
        defender.cooldown_secs = defender.attack_interval;
    }
}
