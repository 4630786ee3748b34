//! Snapshot builders: read-only views over session state.

use hecs::World;

use wildguard_core::components::{Enemy, Health};
use wildguard_core::economy::Ledger;
use wildguard_core::enums::PhaseState;
use wildguard_core::events::SimEvent;
use wildguard_core::state::*;
use wildguard_core::types::{Position, SimTime};

use crate::battle::WaveBattleEngine;
use crate::registry::WildEntityRegistry;
use crate::roster::Roster;

/// Everything a snapshot is built from.
pub struct SnapshotSources<'a> {
    pub time: SimTime,
    pub phase: PhaseState,
    pub phase_time_remaining: Option<f64>,
    pub ledger: &'a Ledger,
    pub registry: &'a WildEntityRegistry,
    pub roster: &'a Roster,
    pub battle: &'a WaveBattleEngine,
}

/// Build a complete SessionSnapshot, handing over the drained events.
pub fn build_snapshot(sources: SnapshotSources<'_>, events: Vec<SimEvent>) -> SessionSnapshot {
    SessionSnapshot {
        time: sources.time,
        phase: sources.phase,
        phase_time_remaining: sources.phase_time_remaining,
        wallet: build_wallet(sources.ledger),
        wild: sources.registry.views(),
        roster: sources.roster.views(),
        battle: sources.battle.view(),
        events,
    }
}

pub fn build_wallet(ledger: &Ledger) -> WalletView {
    WalletView {
        coins: ledger.coins(),
        gems: ledger.gems(),
        souls: ledger.souls(),
        eggs: ledger.eggs(),
        materials: ledger.materials(),
    }
}

/// Enemy views sorted by id.
pub fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&Enemy, &Health, &Position)>()
        .iter()
        .map(|(_, (enemy, health, pos))| EnemyView {
            id: enemy.id,
            kind: enemy.kind,
            position: *pos,
            health: health.current,
            max_health: health.max,
            remaining_distance: enemy.remaining_distance,
        })
        .collect();
    enemies.sort_by_key(|e| e.id);
    enemies
}
