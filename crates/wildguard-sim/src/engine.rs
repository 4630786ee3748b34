//! Session engine: the phase controller.
//!
//! `SessionEngine` owns the phase state, both sub-engines, the roster and the
//! ledger. It routes commands to whichever sub-engine the current phase
//! activates, sub-steps large `dt` values and produces a `SessionSnapshot`
//! per tick. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use wildguard_content::BuiltinContent;
use wildguard_core::commands::{SessionCommand, ShopItem};
use wildguard_core::config::{ConfigError, SessionConfig};
use wildguard_core::constants::MAX_SUBSTEPS_PER_TICK;
use wildguard_core::content::ContentLookup;
use wildguard_core::economy::Ledger;
use wildguard_core::enums::{
    BattleState, Currency, DefeatReason, PhaseState, RarityTier, SessionOutcome,
};
use wildguard_core::error::SimError;
use wildguard_core::events::SimEvent;
use wildguard_core::state::SessionSnapshot;
use wildguard_core::types::{EnemyId, Position, SimTime, UnitId, WildId};

use crate::battle::WaveBattleEngine;
use crate::registry::{CaptureOutcome, DamageReport, WildEntityRegistry};
use crate::roster::Roster;
use crate::systems::snapshot::{build_snapshot, SnapshotSources};

pub struct SessionEngine {
    config: SessionConfig,
    content: Arc<dyn ContentLookup>,
    phase: PhaseState,
    /// Phase that `Paused` resumes into.
    paused_from: Option<PhaseState>,
    /// Phase that `Shop` / `Settings` return to.
    overlay_from: Option<PhaseState>,
    time: SimTime,
    capture_remaining: f64,
    rng: ChaCha8Rng,
    registry: WildEntityRegistry,
    battle: WaveBattleEngine,
    roster: Roster,
    ledger: Ledger,
    command_queue: VecDeque<SessionCommand>,
    events: Vec<SimEvent>,
}

impl SessionEngine {
    /// Engine with the built-in content tables and an empty ledger.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::with_content(config, Arc::new(BuiltinContent))
    }

    pub fn with_content(
        config: SessionConfig,
        content: Arc<dyn ContentLookup>,
    ) -> Result<Self, ConfigError> {
        Self::with_parts(config, content, Ledger::new())
    }

    /// Engine with explicit content and a pre-existing ledger.
    pub fn with_parts(
        config: SessionConfig,
        content: Arc<dyn ContentLookup>,
        ledger: Ledger,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = WildEntityRegistry::new(&config)?;
        let battle = WaveBattleEngine::new(&config);
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            content,
            phase: PhaseState::MainMenu,
            paused_from: None,
            overlay_from: None,
            time: SimTime::default(),
            capture_remaining: 0.0,
            registry,
            battle,
            roster: Roster::new(),
            ledger,
            command_queue: VecDeque::new(),
            events: Vec::new(),
            config,
        })
    }

    // --- Phase control ---

    /// Start a fresh capture phase from `MainMenu` or `GameOver`.
    pub fn start_new_session(&mut self) -> Result<(), SimError> {
        if !matches!(self.phase, PhaseState::MainMenu | PhaseState::GameOver(_)) {
            return Err(self.reject(PhaseState::CapturePhase, "a session is already running"));
        }
        self.registry.reset();
        self.battle.reset();
        self.roster.clear();
        self.paused_from = None;
        self.overlay_from = None;
        self.time = SimTime::default();
        self.capture_remaining = self.config.capture_phase_duration;
        info!(
            seed = self.config.seed,
            capture_secs = self.capture_remaining,
            "session started"
        );
        self.set_phase(PhaseState::CapturePhase);
        Ok(())
    }

    /// Request a phase change. Illegal requests leave the state untouched.
    pub fn force_transition(&mut self, target: PhaseState) -> Result<(), SimError> {
        use PhaseState::*;
        match (self.phase, target) {
            (MainMenu | GameOver(_), CapturePhase) => self.start_new_session(),
            (CapturePhase, DefensePhase) => {
                if self.roster.is_empty() {
                    return Err(self.reject(target, "the roster is empty"));
                }
                self.enter_defense();
                Ok(())
            }
            (CapturePhase | DefensePhase, Paused) => {
                self.paused_from = Some(self.phase);
                self.set_phase(Paused);
                Ok(())
            }
            (Paused, CapturePhase | DefensePhase) if self.paused_from == Some(target) => {
                self.paused_from = None;
                self.set_phase(target);
                Ok(())
            }
            (MainMenu | Paused, Shop | Settings) => {
                self.overlay_from = Some(self.phase);
                self.set_phase(target);
                Ok(())
            }
            (Shop | Settings, _) if self.overlay_from == Some(target) => {
                self.overlay_from = None;
                self.set_phase(target);
                Ok(())
            }
            (Paused | GameOver(_), MainMenu) => {
                self.registry.reset();
                self.battle.reset();
                self.paused_from = None;
                self.set_phase(MainMenu);
                Ok(())
            }
            _ => Err(self.reject(target, "not a legal transition")),
        }
    }

    pub fn pause(&mut self) -> Result<(), SimError> {
        self.force_transition(PhaseState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), SimError> {
        match self.paused_from {
            Some(previous) if self.phase == PhaseState::Paused => {
                self.force_transition(previous)
            }
            _ => Err(self.reject(self.phase, "nothing to resume")),
        }
    }

    pub fn open_shop(&mut self) -> Result<(), SimError> {
        self.force_transition(PhaseState::Shop)
    }

    pub fn open_settings(&mut self) -> Result<(), SimError> {
        self.force_transition(PhaseState::Settings)
    }

    /// Leave `Shop` or `Settings` for the phase that opened it.
    pub fn close_overlay(&mut self) -> Result<(), SimError> {
        match self.overlay_from {
            Some(origin) => self.force_transition(origin),
            None => Err(self.reject(self.phase, "no shop or settings open")),
        }
    }

    pub fn quit_to_menu(&mut self) -> Result<(), SimError> {
        self.force_transition(PhaseState::MainMenu)
    }

    // --- Commands ---

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SessionCommand) {
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SessionCommand>) {
        self.command_queue.extend(commands);
    }

    /// Apply a command immediately.
    pub fn apply_command(&mut self, command: SessionCommand) -> Result<(), SimError> {
        match command {
            SessionCommand::StartSession => self.start_new_session(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Resume => self.resume(),
            SessionCommand::ForceTransition { target } => self.force_transition(target),
            SessionCommand::DamageWild { id, amount } => self.damage_wild(id, amount).map(drop),
            SessionCommand::AttemptCapture { id, assist } => {
                self.attempt_capture(id, assist).map(drop)
            }
            SessionCommand::DamageEnemy { id, amount } => {
                self.damage_enemy(id, amount).map(drop)
            }
            SessionCommand::CallNextWave => self.call_next_wave().map(drop),
            SessionCommand::Purchase { item } => self.purchase(item),
        }
    }

    // --- Tick ---

    /// Apply queued commands, advance the active sub-engine by `dt` seconds
    /// and return the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> SessionSnapshot {
        self.process_commands();

        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "ignoring non-positive or non-finite dt");
        } else if self.phase.is_simulating() {
            let wanted = (dt / self.config.max_substep).ceil().max(1.0);
            let cap = f64::from(MAX_SUBSTEPS_PER_TICK);
            let steps = if wanted.is_finite() && wanted <= cap {
                wanted
            } else {
                warn!(
                    dt,
                    max_substeps = MAX_SUBSTEPS_PER_TICK,
                    "dt too large, widening substeps"
                );
                cap
            };
            let step = dt / steps;
            let mut remaining = steps as u32;
            while remaining > 0 && self.phase.is_simulating() {
                self.step(step);
                self.time.advance(step);
                remaining -= 1;
            }
        }

        self.snapshot()
    }

    // --- Capture phase operations ---

    pub fn damage_wild(&mut self, id: WildId, amount: f64) -> Result<DamageReport, SimError> {
        self.require_phase(PhaseState::CapturePhase)?;
        self.registry
            .apply_damage(id, amount, &mut self.rng, &mut self.ledger, &mut self.events)
    }

    /// Attempt a capture, optionally assisted by a roster unit.
    pub fn attempt_capture(
        &mut self,
        id: WildId,
        assist: Option<UnitId>,
    ) -> Result<CaptureOutcome, SimError> {
        self.require_phase(PhaseState::CapturePhase)?;
        let assist_level = match assist {
            Some(unit) => Some(self.roster.level_of(unit).ok_or_else(|| {
                warn!(%unit, "assist unit not in roster");
                SimError::UnknownUnit(unit)
            })?),
            None => None,
        };
        self.registry.attempt_capture(
            id,
            assist_level,
            &mut self.rng,
            &mut self.ledger,
            &mut self.roster,
            &mut self.events,
        )
    }

    /// Spawn a creature of a chosen tier right now, ignoring cadence and cap.
    pub fn spawn_wild(&mut self, tier: RarityTier, position: Position) -> Result<WildId, SimError> {
        self.require_phase(PhaseState::CapturePhase)?;
        Ok(self.registry.spawn_with_tier(
            tier,
            position,
            &mut self.rng,
            self.content.as_ref(),
            &mut self.events,
        ))
    }

    // --- Defense phase operations ---

    /// Returns the enemy's remaining health.
    pub fn damage_enemy(&mut self, id: EnemyId, amount: f64) -> Result<f64, SimError> {
        self.require_phase(PhaseState::DefensePhase)?;
        let remaining =
            self.battle
                .damage_enemy(id, amount, &mut self.ledger, &mut self.events)?;
        self.check_battle_outcome();
        Ok(remaining)
    }

    /// Start the next wave without waiting for the countdown.
    pub fn call_next_wave(&mut self) -> Result<u32, SimError> {
        self.require_phase(PhaseState::DefensePhase)?;
        self.battle
            .start_next_wave(&mut self.rng, self.content.as_ref(), &mut self.events)
    }

    // --- Shop ---

    pub fn purchase(&mut self, item: ShopItem) -> Result<(), SimError> {
        self.require_phase(PhaseState::Shop)?;
        match item {
            ShopItem::RepairObjective { hp } => self.buy_repair(hp),
            ShopItem::UpgradeUnit { unit } => self.buy_upgrade(unit),
        }
    }

    fn buy_repair(&mut self, hp: u32) -> Result<(), SimError> {
        let in_battle = self.overlay_from == Some(PhaseState::Paused)
            && self.paused_from == Some(PhaseState::DefensePhase);
        if !in_battle {
            return Err(SimError::WrongPhase {
                expected: PhaseState::DefensePhase,
                actual: self.overlay_from.unwrap_or(self.phase),
            });
        }

        let restored = f64::from(hp).min(self.battle.missing_objective_health());
        if restored <= 0.0 {
            debug!("objective already at full health");
            return Ok(());
        }
        let cost = (restored.ceil() as u64).saturating_mul(self.config.costs.repair_cost_per_hp);
        if !self.ledger.spend_coins(cost) {
            return Err(self.insufficient(Currency::Coins, cost as f64));
        }
        self.battle.repair_objective(restored, &mut self.events);
        info!(restored, cost, "objective repaired");
        Ok(())
    }

    fn buy_upgrade(&mut self, unit: UnitId) -> Result<(), SimError> {
        let Some(level) = self.roster.level_of(unit) else {
            warn!(%unit, "upgrade for unit not in roster");
            return Err(SimError::UnknownUnit(unit));
        };
        let cost = self.config.costs.upgrade_souls_per_level * f64::from(level);
        if !self.ledger.spend_souls(cost) {
            return Err(self.insufficient(Currency::Souls, cost));
        }
        if let Some(creature) = self.roster.get_mut(unit) {
            creature.level += 1;
            info!(%unit, level = creature.level, souls = cost, "unit upgraded");
            let creature = creature.clone();
            self.battle.update_defender(&creature);
        }
        Ok(())
    }

    // --- Accessors ---

    pub fn current_phase(&self) -> PhaseState {
        self.phase
    }

    /// Capture countdown in the capture phase, wave countdown while the
    /// battle is in `Setup`, otherwise `None`.
    pub fn time_remaining_in_phase(&self) -> Option<f64> {
        match self.phase {
            PhaseState::CapturePhase => Some(self.capture_remaining.max(0.0)),
            PhaseState::DefensePhase => self.battle.countdown(),
            _ => None,
        }
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn registry(&self) -> &WildEntityRegistry {
        &self.registry
    }

    pub fn battle(&self) -> &WaveBattleEngine {
        &self.battle
    }

    // --- Internals ---

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            if let Err(err) = self.apply_command(command) {
                warn!(%err, "command rejected");
                self.events.push(SimEvent::CommandRejected {
                    reason: err.to_string(),
                });
            }
        }
    }

    fn step(&mut self, dt: f64) {
        match self.phase {
            PhaseState::CapturePhase => {
                self.registry
                    .tick(dt, &mut self.rng, self.content.as_ref(), &mut self.events);
                self.capture_remaining -= dt;
                if self.capture_remaining <= 0.0 {
                    self.capture_remaining = 0.0;
                    self.capture_timer_expired();
                }
            }
            PhaseState::DefensePhase => {
                self.battle.tick(
                    dt,
                    &mut self.rng,
                    self.content.as_ref(),
                    &mut self.ledger,
                    &mut self.events,
                );
                self.check_battle_outcome();
            }
            _ => {}
        }
    }

    fn capture_timer_expired(&mut self) {
        if self.roster.is_empty() {
            info!("capture phase over with an empty roster");
            self.lose(DefeatReason::EmptyRoster);
        } else {
            self.enter_defense();
        }
    }

    fn enter_defense(&mut self) {
        self.registry.reset();
        self.battle.begin(&self.roster, &mut self.events);
        self.set_phase(PhaseState::DefensePhase);
    }

    fn check_battle_outcome(&mut self) {
        let state = self.battle.state();
        if !self.phase.is_simulating() || !state.is_over() {
            return;
        }
        match state {
            BattleState::Victory => self.win(),
            BattleState::Defeat => self.lose(DefeatReason::ObjectiveDestroyed),
            _ => {}
        }
    }

    fn win(&mut self) {
        self.ledger.add_gems(self.config.victory_gems);
        let waves_cleared = self.battle.wave_index();
        info!(waves_cleared, gems = self.config.victory_gems, "session won");
        self.events.push(SimEvent::SessionVictory { waves_cleared });
        self.registry.reset();
        self.set_phase(PhaseState::GameOver(SessionOutcome::Victory));
    }

    fn lose(&mut self, reason: DefeatReason) {
        info!(?reason, "session lost");
        self.events.push(SimEvent::SessionDefeat { reason });
        self.registry.reset();
        self.set_phase(PhaseState::GameOver(SessionOutcome::Defeat));
    }

    fn set_phase(&mut self, to: PhaseState) {
        let from = self.phase;
        self.phase = to;
        info!(%from, %to, "phase changed");
        self.events.push(SimEvent::PhaseChanged { from, to });
    }

    fn require_phase(&self, expected: PhaseState) -> Result<(), SimError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SimError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn reject(&self, to: PhaseState, reason: &'static str) -> SimError {
        warn!(from = %self.phase, %to, reason, "transition rejected");
        SimError::InvalidTransition {
            from: self.phase,
            to,
            reason,
        }
    }

    fn insufficient(&self, currency: Currency, needed: f64) -> SimError {
        let available = match currency {
            Currency::Coins => self.ledger.coins() as f64,
            Currency::Gems => self.ledger.gems() as f64,
            Currency::Souls => self.ledger.souls(),
        };
        warn!(%currency, needed, available, "purchase declined");
        SimError::InsufficientFunds {
            currency,
            needed,
            available,
        }
    }

    fn snapshot(&mut self) -> SessionSnapshot {
        let events = std::mem::take(&mut self.events);
        build_snapshot(
            SnapshotSources {
                time: self.time,
                phase: self.phase,
                phase_time_remaining: self.time_remaining_in_phase(),
                ledger: &self.ledger,
                registry: &self.registry,
                roster: &self.roster,
                battle: &self.battle,
            },
            events,
        )
    }
}
