//! Enemy advance along the straight path to the objective.
//!
//! The objective sits at the origin; an enemy's position is its heading
//! scaled by the distance it still has to cover.

use hecs::World;

use wildguard_core::components::Enemy;
use wildguard_core::types::{EnemyId, Position};

/// Enemies already within `attack_range` of the objective hit it; the rest
/// advance. No enemy does both in one step. Contacts are sorted by id.
pub fn run(world: &mut World, dt: f64, attack_range: f64, contacts: &mut Vec<EnemyId>) {
    for (_entity, (enemy, pos)) in world.query_mut::<(&mut Enemy, &mut Position)>() {
        if enemy.remaining_distance <= attack_range {
            contacts.push(enemy.id);
            continue;
        }
        enemy.remaining_distance = (enemy.remaining_distance - enemy.speed * dt).max(0.0);
        *pos = enemy.heading * enemy.remaining_distance;
    }
    contacts.sort_unstable();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use wildguard_core::enums::EnemyKind;

    fn enemy(id: u32, speed: f64, distance: f64) -> (Enemy, Position) {
        (
            Enemy {
                id: EnemyId(id),
                kind: EnemyKind::Runner,
                speed,
                damage: 1.0,
                remaining_distance: distance,
                heading: DVec2::Y,
                reward_coins: 1,
                reward_souls: 0.0,
            },
            DVec2::Y * distance,
        )
    }

    #[test]
    fn enemies_advance_toward_origin() {
        let mut world = World::new();
        let e = world.spawn(enemy(0, 10.0, 50.0));
        let mut contacts = Vec::new();
        run(&mut world, 0.5, 1.5, &mut contacts);

        assert!(contacts.is_empty());
        let pos = *world.get::<&Position>(e).unwrap();
        assert!((pos - DVec2::new(0.0, 45.0)).length() < 1e-9);
    }

    #[test]
    fn arrival_hits_on_the_following_step() {
        let mut world = World::new();
        world.spawn(enemy(4, 100.0, 2.0));
        world.spawn(enemy(2, 1.0, 1.0));
        let mut contacts = Vec::new();
        run(&mut world, 1.0, 1.5, &mut contacts);
        assert_eq!(contacts, vec![EnemyId(2)]);

        for (_, enemy) in world.query_mut::<&Enemy>() {
            assert!(enemy.remaining_distance >= 0.0);
        }

        contacts.clear();
        run(&mut world, 1.0, 1.5, &mut contacts);
        assert_eq!(contacts, vec![EnemyId(2), EnemyId(4)]);
    }
}
