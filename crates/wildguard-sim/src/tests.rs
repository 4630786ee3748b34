//! Tests for the session engine, the wild registry and the phase flow.

use std::sync::Arc;

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use wildguard_content::BuiltinContent;
use wildguard_core::commands::{SessionCommand, ShopItem};
use wildguard_core::config::SessionConfig;
use wildguard_core::constants::MAX_SUBSTEPS_PER_TICK;
use wildguard_core::content::{ContentLookup, CreatureTemplate, EnemyProfile};
use wildguard_core::economy::Ledger;
use wildguard_core::enums::*;
use wildguard_core::error::SimError;
use wildguard_core::events::SimEvent;
use wildguard_core::types::{Position, UnitId, WildId};

use crate::capture::capture_chance;
use crate::engine::SessionEngine;
use crate::registry::{CaptureOutcome, WildEntityRegistry};
use crate::roster::Roster;

/// Built-in tables with every creature's attack and speed overridden.
struct TunedContent {
    attack: f64,
    speed: f64,
}

impl ContentLookup for TunedContent {
    fn creature_template(&self, tier: RarityTier) -> CreatureTemplate {
        let mut template = BuiltinContent.creature_template(tier);
        template.base.attack = self.attack;
        template.base.speed = self.speed;
        template
    }

    fn enemy_profile(&self, wave_index: u32, kind: EnemyKind) -> EnemyProfile {
        BuiltinContent.enemy_profile(wave_index, kind)
    }
}

/// Captures always land eventually: a failed roll leaves the creature in place.
fn flow_config() -> SessionConfig {
    SessionConfig {
        base_capture_rate: 1.0,
        capture_failure_policy: CaptureFailurePolicy::Retry,
        final_wave: 1,
        ..Default::default()
    }
}

fn started(config: SessionConfig) -> SessionEngine {
    let mut engine = SessionEngine::new(config).unwrap();
    engine.start_new_session().unwrap();
    engine
}

fn started_with(config: SessionConfig, content: TunedContent, ledger: Ledger) -> SessionEngine {
    let mut engine = SessionEngine::with_parts(config, Arc::new(content), ledger).unwrap();
    engine.start_new_session().unwrap();
    engine
}

fn capture_one(engine: &mut SessionEngine) -> UnitId {
    let id = engine
        .spawn_wild(RarityTier::Common, Position::ZERO)
        .unwrap();
    let max = engine.registry().health(id).unwrap().max;
    engine.damage_wild(id, max * 0.8).unwrap();
    for _ in 0..100 {
        if let CaptureOutcome::Captured { unit, .. } = engine.attempt_capture(id, None).unwrap() {
            return unit;
        }
    }
    panic!("capture never succeeded");
}

/// Tick until the session ends, returning every event seen.
fn run_to_game_over(engine: &mut SessionEngine, max_ticks: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        let snapshot = engine.tick(0.5);
        events.extend(snapshot.events);
        if matches!(engine.current_phase(), PhaseState::GameOver(_)) {
            break;
        }
    }
    events
}

fn registry_fixture(config: &SessionConfig) -> (WildEntityRegistry, ChaCha8Rng, Ledger, Vec<SimEvent>) {
    (
        WildEntityRegistry::new(config).unwrap(),
        ChaCha8Rng::seed_from_u64(config.seed),
        Ledger::new(),
        Vec::new(),
    )
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let config = SessionConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = started(config.clone());
    let mut engine_b = started(config);

    for _ in 0..400 {
        let snap_a = engine_a.tick(0.5);
        let snap_b = engine_b.tick(0.5);
        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = started(SessionConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = started(SessionConfig {
        seed: 222,
        ..Default::default()
    });

    let json_a = serde_json::to_string(&engine_a.tick(0.1)).unwrap();
    let json_b = serde_json::to_string(&engine_b.tick(0.1)).unwrap();
    assert_ne!(json_a, json_b, "Different seeds should produce divergent output");
}

// ---- Wild registry ----

#[test]
fn test_first_spawn_on_first_tick() {
    let mut engine = started(SessionConfig::default());
    let snapshot = engine.tick(0.1);
    assert_eq!(snapshot.wild.len(), 1);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::WildSpawned { .. })));
}

#[test]
fn test_spawn_respects_population_cap() {
    let mut engine = started(SessionConfig {
        max_wild_entities: 3,
        spawn_interval: 1.0,
        wild_despawn_time: 1000.0,
        ..Default::default()
    });
    for _ in 0..20 {
        engine.tick(1.0);
    }
    assert_eq!(engine.registry().len(), 3);
}

#[test]
fn test_spawns_stay_inside_area() {
    let mut engine = started(SessionConfig {
        spawn_interval: 0.5,
        spawn_area_half_extent: 10.0,
        ..Default::default()
    });
    let snapshot = engine.tick(4.0);
    assert!(!snapshot.wild.is_empty());
    for wild in &snapshot.wild {
        assert!(wild.position.x.abs() <= 10.0 && wild.position.y.abs() <= 10.0);
        assert_eq!(wild.health, wild.max_health);
        assert!(!wild.capturable);
    }
}

#[test]
fn test_despawn_after_timeout_without_drops() {
    let mut engine = started(SessionConfig {
        wild_despawn_time: 2.0,
        spawn_interval: 100.0,
        ..Default::default()
    });
    engine.tick(0.1);
    assert_eq!(engine.registry().len(), 1);

    let snapshot = engine.tick(2.5);
    assert!(engine.registry().is_empty());
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::WildDespawned { .. })));
    assert_eq!(engine.ledger().coins(), 0);
}

#[test]
fn test_lethal_damage_takes_death_path() {
    let mut engine = started(SessionConfig::default());
    let id = engine
        .spawn_wild(RarityTier::Common, Position::ZERO)
        .unwrap();
    let max = engine.registry().health(id).unwrap().max;

    let report = engine.damage_wild(id, max).unwrap();
    assert!(report.died);
    assert_eq!(report.remaining_health, 0.0);
    let drops = report.drops.unwrap();
    assert!((5..=15).contains(&drops.coins));
    assert_eq!(drops.eggs, 0);
    assert_eq!(drops.materials, 0);
    assert_eq!(engine.ledger().coins(), drops.coins);
    assert!(!engine.registry().contains(id));

    assert_eq!(
        engine.damage_wild(id, 1.0).unwrap_err(),
        SimError::UnknownWild(id)
    );
}

#[test]
fn test_capturable_threshold_latches() {
    let mut engine = started(SessionConfig::default());
    let id = engine
        .spawn_wild(RarityTier::Rare, Position::ZERO)
        .unwrap();
    let max = engine.registry().health(id).unwrap().max;

    let report = engine.damage_wild(id, max * 0.5).unwrap();
    assert!(!report.became_capturable);
    assert_eq!(engine.registry().is_capturable(id), Some(false));

    let report = engine.damage_wild(id, max * 0.2).unwrap();
    assert!(report.became_capturable);
    assert_eq!(engine.registry().is_capturable(id), Some(true));

    let report = engine.damage_wild(id, max * 0.05).unwrap();
    assert!(!report.became_capturable);
    assert_eq!(engine.registry().is_capturable(id), Some(true));
}

#[test]
fn test_invalid_damage_amounts_are_ignored() {
    let mut engine = started(SessionConfig::default());
    let id = engine
        .spawn_wild(RarityTier::Common, Position::ZERO)
        .unwrap();
    let max = engine.registry().health(id).unwrap().max;

    for amount in [-10.0, f64::NAN, f64::NEG_INFINITY] {
        let report = engine.damage_wild(id, amount).unwrap();
        assert_eq!(report.remaining_health, max);
    }
}

#[test]
fn test_capture_rejected_before_threshold_consumes_no_randomness() {
    let config = SessionConfig::default();
    let (mut registry, mut rng, mut ledger, mut events) = registry_fixture(&config);
    let id = registry.spawn_with_tier(
        RarityTier::Common,
        Position::ZERO,
        &mut rng,
        &BuiltinContent,
        &mut events,
    );
    let mut roster = Roster::new();
    let mut reference = rng.clone();

    let err = registry
        .attempt_capture(id, None, &mut rng, &mut ledger, &mut roster, &mut events)
        .unwrap_err();
    assert_eq!(err, SimError::NotCapturable(id));
    assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    assert!(roster.is_empty());
    assert!(registry.contains(id));
}

#[test]
fn test_capture_enrolls_unit_and_pays_drops() {
    let mut engine = started(flow_config());
    let unit = capture_one(&mut engine);

    assert_eq!(engine.roster().len(), 1);
    let captured = engine.roster().get(unit).unwrap();
    assert_eq!(captured.level, 1);
    assert_eq!(captured.tier, RarityTier::Common);
    assert!(engine.registry().is_empty());
    assert!(engine.ledger().coins() >= 20);
}

#[test]
fn test_escape_policy_destroys_on_failure() {
    let mut engine = started(SessionConfig {
        base_capture_rate: 0.0,
        ..Default::default()
    });
    let mut escapes = 0;
    for _ in 0..10 {
        let id = engine
            .spawn_wild(RarityTier::Legendary, Position::ZERO)
            .unwrap();
        let max = engine.registry().health(id).unwrap().max;
        engine.damage_wild(id, max * 0.75).unwrap();

        let coins_before = engine.ledger().coins();
        let outcome = engine.attempt_capture(id, None).unwrap();
        assert!((outcome.chance() - 0.05).abs() < 1e-12);
        assert!(!engine.registry().contains(id));
        if let CaptureOutcome::Escaped { .. } = outcome {
            escapes += 1;
            assert_eq!(engine.ledger().coins(), coins_before);
        }
    }
    assert!(escapes > 0);
}

#[test]
fn test_retry_policy_keeps_creature() {
    let mut engine = started(SessionConfig {
        base_capture_rate: 0.0,
        capture_failure_policy: CaptureFailurePolicy::Retry,
        ..Default::default()
    });
    let id = engine
        .spawn_wild(RarityTier::Legendary, Position::ZERO)
        .unwrap();
    let max = engine.registry().health(id).unwrap().max;
    engine.damage_wild(id, max * 0.75).unwrap();

    let mut resisted = false;
    for _ in 0..10 {
        match engine.attempt_capture(id, None).unwrap() {
            CaptureOutcome::Resisted { .. } => {
                resisted = true;
                assert_eq!(engine.registry().is_capturable(id), Some(true));
            }
            _ => break,
        }
    }
    assert!(resisted);
}

#[test]
fn test_assist_requires_roster_unit() {
    let mut engine = started(flow_config());
    let id = engine
        .spawn_wild(RarityTier::Common, Position::ZERO)
        .unwrap();
    assert_eq!(
        engine.attempt_capture(id, Some(UnitId(7))).unwrap_err(),
        SimError::UnknownUnit(UnitId(7))
    );
}

// ---- Phase control ----

#[test]
fn test_empty_roster_at_capture_expiry_is_defeat() {
    let mut engine = started(SessionConfig {
        capture_phase_duration: 300.0,
        ..Default::default()
    });
    let mut events = Vec::new();
    for _ in 0..301 {
        events.extend(engine.tick(1.0).events);
    }
    assert_eq!(
        engine.current_phase(),
        PhaseState::GameOver(SessionOutcome::Defeat)
    );
    assert!(events.contains(&SimEvent::SessionDefeat {
        reason: DefeatReason::EmptyRoster
    }));
    assert!(engine.registry().is_empty());
    assert_eq!(engine.time_remaining_in_phase(), None);
}

#[test]
fn test_capture_expiry_with_roster_enters_defense() {
    let mut engine = started(SessionConfig {
        capture_phase_duration: 10.0,
        ..flow_config()
    });
    capture_one(&mut engine);
    engine.tick(10.5);

    assert_eq!(engine.current_phase(), PhaseState::DefensePhase);
    assert!(engine.registry().is_empty());
    assert_eq!(engine.battle().defender_count(), 1);
    assert_eq!(engine.battle().state(), BattleState::Setup);
}

#[test]
fn test_forced_defense_with_empty_roster_is_rejected() {
    let mut engine = started(SessionConfig::default());
    let err = engine
        .force_transition(PhaseState::DefensePhase)
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::InvalidTransition {
            from: PhaseState::CapturePhase,
            to: PhaseState::DefensePhase,
            ..
        }
    ));
    assert_eq!(engine.current_phase(), PhaseState::CapturePhase);
}

#[test]
fn test_illegal_transitions_leave_state_untouched() {
    let mut engine = SessionEngine::new(SessionConfig::default()).unwrap();
    for target in [
        PhaseState::DefensePhase,
        PhaseState::Paused,
        PhaseState::GameOver(SessionOutcome::Victory),
        PhaseState::MainMenu,
    ] {
        assert!(engine.force_transition(target).is_err());
        assert_eq!(engine.current_phase(), PhaseState::MainMenu);
    }

    engine.start_new_session().unwrap();
    assert!(engine.start_new_session().is_err());
    assert!(engine
        .force_transition(PhaseState::GameOver(SessionOutcome::Defeat))
        .is_err());
    assert!(engine.force_transition(PhaseState::Shop).is_err());
    assert_eq!(engine.current_phase(), PhaseState::CapturePhase);
}

#[test]
fn test_pause_freezes_and_resume_returns() {
    let mut engine = started(SessionConfig::default());
    engine.tick(1.0);
    let remaining = engine.time_remaining_in_phase().unwrap();
    let time = engine.time();

    engine.pause().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::Paused);
    assert_eq!(engine.time_remaining_in_phase(), None);
    engine.tick(50.0);
    assert_eq!(engine.time().tick, time.tick);

    engine.resume().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::CapturePhase);
    assert_eq!(engine.time_remaining_in_phase(), Some(remaining));
}

#[test]
fn test_overlays_return_to_origin() {
    let mut engine = SessionEngine::new(SessionConfig::default()).unwrap();
    engine.open_shop().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::Shop);
    engine.close_overlay().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::MainMenu);

    engine.start_new_session().unwrap();
    engine.pause().unwrap();
    engine.open_settings().unwrap();
    assert!(engine.resume().is_err());
    engine.close_overlay().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::Paused);
    engine.resume().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::CapturePhase);
}

#[test]
fn test_quit_from_pause_returns_to_menu() {
    let mut engine = started(SessionConfig::default());
    engine.tick(1.0);
    engine.pause().unwrap();
    engine.quit_to_menu().unwrap();
    assert_eq!(engine.current_phase(), PhaseState::MainMenu);
    assert!(engine.registry().is_empty());
    engine.start_new_session().unwrap();
}

#[test]
fn test_operations_require_their_phase() {
    let mut engine = SessionEngine::new(SessionConfig::default()).unwrap();
    assert_eq!(
        engine.damage_wild(WildId(0), 1.0).unwrap_err(),
        SimError::WrongPhase {
            expected: PhaseState::CapturePhase,
            actual: PhaseState::MainMenu
        }
    );
    engine.start_new_session().unwrap();
    assert!(matches!(
        engine.call_next_wave(),
        Err(SimError::WrongPhase { .. })
    ));
    assert!(matches!(
        engine.purchase(ShopItem::RepairObjective { hp: 1 }),
        Err(SimError::WrongPhase { .. })
    ));
}

#[test]
fn test_rejected_queued_command_becomes_event() {
    let mut engine = SessionEngine::new(SessionConfig::default()).unwrap();
    engine.queue_command(SessionCommand::CallNextWave);
    engine.queue_command(SessionCommand::StartSession);
    let snapshot = engine.tick(0.1);

    assert!(matches!(
        snapshot.events.first(),
        Some(SimEvent::CommandRejected { .. })
    ));
    assert_eq!(snapshot.phase, PhaseState::CapturePhase);
}

#[test]
fn test_invalid_dt_is_ignored() {
    let mut engine = started(SessionConfig::default());
    for dt in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        engine.tick(dt);
    }
    assert_eq!(engine.time().tick, 0);
    assert_eq!(
        engine.time_remaining_in_phase(),
        Some(engine.config().capture_phase_duration)
    );
}

#[test]
fn test_large_dt_is_substepped() {
    let mut engine = started(SessionConfig::default());
    engine.tick(1.0);
    assert_eq!(engine.time().tick, 10);
    assert!((engine.time().elapsed_secs - 1.0).abs() < 1e-9);
}

#[test]
fn test_huge_dt_is_capped_and_returns() {
    let mut engine = started(SessionConfig::default());
    let snapshot = engine.tick(1.0e308);
    assert!(snapshot.time.tick <= u64::from(MAX_SUBSTEPS_PER_TICK));
    // Nothing captured, so the capture timer ran out into a defeat.
    assert_eq!(
        engine.current_phase(),
        PhaseState::GameOver(SessionOutcome::Defeat)
    );
}

#[test]
fn test_engine_refuses_denormal_substep() {
    let config = SessionConfig {
        max_substep: 1e-310,
        ..Default::default()
    };
    assert!(SessionEngine::new(config).is_err());
}

#[test]
fn test_widened_substeps_cover_the_whole_dt() {
    let config = SessionConfig {
        capture_phase_duration: 1.0e9,
        ..Default::default()
    };
    let mut engine = started(config);
    engine.tick(1.0e6);
    assert_eq!(engine.time().tick, u64::from(MAX_SUBSTEPS_PER_TICK));
    assert!((engine.time().elapsed_secs - 1.0e6).abs() < 1e-3);
    assert_eq!(engine.current_phase(), PhaseState::CapturePhase);
}

// ---- Defense phase ----

#[test]
fn test_call_next_wave_skips_countdown() {
    let mut engine = started(flow_config());
    capture_one(&mut engine);
    engine.force_transition(PhaseState::DefensePhase).unwrap();
    assert_eq!(
        engine.time_remaining_in_phase(),
        Some(engine.config().setup_delay)
    );

    assert_eq!(engine.call_next_wave().unwrap(), 1);
    assert_eq!(engine.battle().state(), BattleState::WaveStart);
    assert_eq!(engine.time_remaining_in_phase(), None);
    assert_eq!(
        engine.call_next_wave().unwrap_err(),
        SimError::WaveInProgress { wave_index: 1 }
    );
}

#[test]
fn test_final_wave_cleared_is_victory() {
    let mut engine = started_with(
        flow_config(),
        TunedContent {
            attack: 1.0e6,
            speed: 1000.0,
        },
        Ledger::new(),
    );
    capture_one(&mut engine);
    engine.force_transition(PhaseState::DefensePhase).unwrap();

    let events = run_to_game_over(&mut engine, 400);
    assert_eq!(
        engine.current_phase(),
        PhaseState::GameOver(SessionOutcome::Victory)
    );
    assert!(events.contains(&SimEvent::SessionVictory { waves_cleared: 1 }));
    assert!(events.contains(&SimEvent::WaveCompleted {
        wave_index: 1,
        bonus_coins: 10
    }));
    assert_eq!(engine.ledger().gems(), 5);
    assert_eq!(
        engine.battle().objective().health,
        engine.battle().objective().max_health
    );
}

#[test]
fn test_objective_destroyed_is_defeat() {
    let mut engine = started_with(
        SessionConfig {
            objective_max_health: 50.0,
            ..flow_config()
        },
        TunedContent {
            attack: 0.0,
            speed: 20.0,
        },
        Ledger::new(),
    );
    capture_one(&mut engine);
    engine.force_transition(PhaseState::DefensePhase).unwrap();

    let events = run_to_game_over(&mut engine, 400);
    assert_eq!(
        engine.current_phase(),
        PhaseState::GameOver(SessionOutcome::Defeat)
    );
    assert!(events.contains(&SimEvent::SessionDefeat {
        reason: DefeatReason::ObjectiveDestroyed
    }));
    assert_eq!(engine.battle().objective().health, 0.0);

    let healths: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::ObjectiveHealthChanged { health, .. } => Some(*health),
            _ => None,
        })
        .collect();
    assert!(healths.windows(2).all(|w| w[1] <= w[0]));
}

// ---- Shop ----

#[test]
fn test_upgrade_spends_souls_per_level() {
    let mut engine = started_with(
        flow_config(),
        TunedContent {
            attack: 10.0,
            speed: 20.0,
        },
        Ledger::with_balances(0, 0, 20.0),
    );
    let unit = capture_one(&mut engine);
    let souls = engine.ledger().souls();
    engine.pause().unwrap();
    engine.open_shop().unwrap();

    engine.purchase(ShopItem::UpgradeUnit { unit }).unwrap();
    assert_eq!(engine.roster().level_of(unit), Some(2));
    assert!((engine.ledger().souls() - (souls - 5.0)).abs() < 1e-9);

    engine.purchase(ShopItem::UpgradeUnit { unit }).unwrap();
    assert_eq!(engine.roster().level_of(unit), Some(3));

    let before = engine.ledger().souls();
    if before < 15.0 {
        assert!(matches!(
            engine.purchase(ShopItem::UpgradeUnit { unit }),
            Err(SimError::InsufficientFunds {
                currency: Currency::Souls,
                ..
            })
        ));
        assert_eq!(engine.roster().level_of(unit), Some(3));
        assert_eq!(engine.ledger().souls(), before);
    }

    assert_eq!(
        engine.purchase(ShopItem::UpgradeUnit { unit: UnitId(42) }),
        Err(SimError::UnknownUnit(UnitId(42)))
    );
}

#[test]
fn test_repair_only_from_paused_defense() {
    let mut engine = started_with(
        flow_config(),
        TunedContent {
            attack: 0.0,
            speed: 20.0,
        },
        Ledger::with_balances(1000, 0, 0.0),
    );
    capture_one(&mut engine);
    engine.pause().unwrap();
    engine.open_shop().unwrap();
    assert!(matches!(
        engine.purchase(ShopItem::RepairObjective { hp: 10 }),
        Err(SimError::WrongPhase { .. })
    ));
    engine.close_overlay().unwrap();
    engine.resume().unwrap();

    engine.force_transition(PhaseState::DefensePhase).unwrap();
    let max = engine.battle().objective().max_health;
    for _ in 0..200 {
        engine.tick(0.5);
        if engine.battle().objective().health < max {
            break;
        }
    }
    let damaged = engine.battle().objective().health;
    assert!(damaged < max);

    engine.pause().unwrap();
    engine.open_shop().unwrap();
    let coins = engine.ledger().coins();
    engine
        .purchase(ShopItem::RepairObjective { hp: 10 })
        .unwrap();
    assert_eq!(engine.ledger().coins(), coins - 20);
    assert!((engine.battle().objective().health - (damaged + 10.0)).abs() < 1e-9);
}

#[test]
fn test_repair_with_insufficient_coins_is_rejected() {
    let mut engine = started_with(
        flow_config(),
        TunedContent {
            attack: 0.0,
            speed: 20.0,
        },
        Ledger::new(),
    );
    capture_one(&mut engine);
    engine.force_transition(PhaseState::DefensePhase).unwrap();
    let max = engine.battle().objective().max_health;
    for _ in 0..200 {
        engine.tick(0.5);
        if engine.battle().objective().health < max {
            break;
        }
    }
    engine.pause().unwrap();
    engine.open_shop().unwrap();

    let coins = engine.ledger().coins();
    let health = engine.battle().objective().health;
    let hp = (coins / 2 + 1) as u32;
    let missing = max - health;
    if f64::from(hp) <= missing {
        assert!(matches!(
            engine.purchase(ShopItem::RepairObjective { hp }),
            Err(SimError::InsufficientFunds {
                currency: Currency::Coins,
                ..
            })
        ));
        assert_eq!(engine.ledger().coins(), coins);
        assert_eq!(engine.battle().objective().health, health);
    }
}

// ---- Sessions ----

#[test]
fn test_ledger_persists_and_roster_resets_between_sessions() {
    let mut engine = started(SessionConfig {
        capture_phase_duration: 5.0,
        ..flow_config()
    });
    capture_one(&mut engine);
    let coins = engine.ledger().coins();
    engine.pause().unwrap();
    engine.quit_to_menu().unwrap();

    engine.start_new_session().unwrap();
    assert!(engine.roster().is_empty());
    assert_eq!(engine.ledger().coins(), coins);
    assert_eq!(
        engine.time_remaining_in_phase(),
        Some(engine.config().capture_phase_duration)
    );
}

// ---- Invariants ----

proptest! {
    #[test]
    fn prop_wild_health_stays_bounded_and_capturable_latches(
        seed in any::<u64>(),
        tier in 0usize..5,
        amounts in prop::collection::vec(-50.0f64..150.0, 1..40),
    ) {
        let config = SessionConfig { seed, ..Default::default() };
        let (mut registry, mut rng, mut ledger, mut events) = registry_fixture(&config);
        let id = registry.spawn_with_tier(
            RarityTier::from_index(tier),
            Position::ZERO,
            &mut rng,
            &BuiltinContent,
            &mut events,
        );

        let mut was_capturable = false;
        for amount in amounts {
            let report = registry
                .apply_damage(id, amount, &mut rng, &mut ledger, &mut events)
                .unwrap();
            if report.died {
                prop_assert!(!registry.contains(id));
                break;
            }
            let health = registry.health(id).unwrap();
            prop_assert!(health.current >= 0.0 && health.current <= health.max);
            let capturable = registry.is_capturable(id).unwrap();
            prop_assert!(capturable || !was_capturable);
            was_capturable = capturable;
        }
    }

    #[test]
    fn prop_capture_chance_rises_as_health_falls(
        base in 0.0f64..1.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
        tier in 0usize..5,
        assist in prop::option::of(1u32..20),
    ) {
        let difficulty = BuiltinContent
            .creature_template(RarityTier::from_index(tier))
            .capture_difficulty;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let p_low = capture_chance(base, low, difficulty, assist);
        let p_high = capture_chance(base, high, difficulty, assist);
        prop_assert!(p_low >= p_high);
        prop_assert!((0.05..=0.95).contains(&p_low));
    }

    #[test]
    fn prop_capture_chance_falls_with_tier(
        base in 0.0f64..1.0,
        ratio in 0.0f64..1.0,
        tier in 0usize..4,
    ) {
        let lower = BuiltinContent.creature_template(RarityTier::from_index(tier));
        let higher = BuiltinContent.creature_template(RarityTier::from_index(tier + 1));
        prop_assert!(
            capture_chance(base, ratio, lower.capture_difficulty, None)
                >= capture_chance(base, ratio, higher.capture_difficulty, None)
        );
    }
}
