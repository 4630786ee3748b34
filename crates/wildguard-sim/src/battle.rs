//! Wave battle engine: the defense phase.
//!
//! Owns the objective, the deployed defenders and a hecs world of enemies.
//! Waves start after a countdown (or on demand), spawn their enemies at a
//! fixed cadence and complete when the last enemy leaves the field.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use wildguard_core::components::{CapturedCreature, Defender, Enemy, Health};
use wildguard_core::config::SessionConfig;
use wildguard_core::constants::DEFENDER_RING_RADIUS;
use wildguard_core::content::ContentLookup;
use wildguard_core::economy::Ledger;
use wildguard_core::enums::{BattleState, EnemyKind};
use wildguard_core::error::SimError;
use wildguard_core::events::SimEvent;
use wildguard_core::state::BattleView;
use wildguard_core::types::{EnemyId, IdAllocator, Position};

use crate::roster::Roster;
use crate::systems::{self, defenders::Strike};
use crate::wave::{compose_wave, WaveDefinition};

/// The structure enemies attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub health: f64,
    pub max_health: f64,
}

pub struct WaveBattleEngine {
    world: World,
    enemies: HashMap<EnemyId, Entity>,
    ids: IdAllocator,
    state: BattleState,
    /// Index of the most recently started wave; 0 before wave 1.
    wave_index: u32,
    current: Option<WaveDefinition>,
    pending: VecDeque<EnemyKind>,
    spawn_timer: f64,
    /// Seconds until the next wave starts on its own while in `Setup`.
    countdown: f64,
    objective: Objective,
    config: SessionConfig,
    strikes: Vec<Strike>,
    contacts: Vec<EnemyId>,
}

impl WaveBattleEngine {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            world: World::new(),
            enemies: HashMap::new(),
            ids: IdAllocator::default(),
            state: BattleState::Idle,
            wave_index: 0,
            current: None,
            pending: VecDeque::new(),
            spawn_timer: 0.0,
            countdown: 0.0,
            objective: Objective {
                health: config.objective_max_health,
                max_health: config.objective_max_health,
            },
            config: config.clone(),
            strikes: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Back to `Idle` with an empty field.
    pub fn reset(&mut self) {
        self.world.clear();
        self.enemies.clear();
        self.state = BattleState::Idle;
        self.wave_index = 0;
        self.current = None;
        self.pending.clear();
        self.spawn_timer = 0.0;
        self.countdown = 0.0;
        self.objective.health = self.objective.max_health;
    }

    /// Deploy the roster, restore the objective and start the setup countdown.
    pub fn begin(&mut self, roster: &Roster, events: &mut Vec<SimEvent>) {
        self.reset();

        let count = roster.len().max(1) as f64;
        for (slot, unit) in roster.iter().enumerate() {
            let angle = TAU * slot as f64 / count;
            let position: Position = DVec2::from_angle(angle) * DEFENDER_RING_RADIUS;
            self.world
                .spawn((systems::defenders::defender_for(unit), position));
        }

        self.state = BattleState::Setup;
        self.countdown = self.config.setup_delay;
        info!(
            defenders = roster.len(),
            setup_secs = self.countdown,
            "battle begins"
        );
        events.push(SimEvent::ObjectiveHealthChanged {
            health: self.objective.health,
            max_health: self.objective.max_health,
        });
    }

    /// Start the next wave now, skipping any remaining countdown.
    /// Returns the new wave index.
    pub fn start_next_wave(
        &mut self,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) -> Result<u32, SimError> {
        if self.state.wave_in_progress() {
            return Err(SimError::WaveInProgress {
                wave_index: self.wave_index,
            });
        }
        if self.state != BattleState::Setup {
            return Err(SimError::BattleOver);
        }

        self.wave_index += 1;
        let wave = compose_wave(&self.config, self.wave_index, rng);
        info!(
            wave = wave.wave_index,
            enemies = wave.enemy_count,
            difficulty = wave.difficulty,
            "wave started"
        );
        events.push(SimEvent::WaveStarted {
            wave_index: wave.wave_index,
            enemy_count: wave.enemy_count,
            difficulty: wave.difficulty,
        });

        self.pending = wave.kinds.iter().copied().collect();
        self.current = Some(wave);
        self.state = BattleState::WaveStart;
        self.countdown = 0.0;
        self.spawn_timer = 0.0;
        self.spawn_due(0.0, rng, content, events);
        Ok(self.wave_index)
    }

    /// Advance one step: countdown or spawning, defender strikes, then enemy advance.
    pub fn tick(
        &mut self,
        dt: f64,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) {
        match self.state {
            BattleState::Idle | BattleState::Victory | BattleState::Defeat => return,
            BattleState::Setup => {
                self.countdown -= dt;
                if self.countdown <= 0.0 {
                    // Cannot fail from Setup.
                    let _ = self.start_next_wave(rng, content, events);
                }
            }
            BattleState::WaveStart => self.spawn_due(dt, rng, content, events),
            BattleState::Fighting => {}
        }

        let mut strikes = std::mem::take(&mut self.strikes);
        strikes.clear();
        systems::defenders::run(&mut self.world, dt, &mut strikes);
        for strike in &strikes {
            self.hit(strike.enemy, strike.damage, ledger, events);
        }
        self.strikes = strikes;

        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.clear();
        systems::movement::run(
            &mut self.world,
            dt,
            self.config.enemy_attack_range,
            &mut contacts,
        );
        for &id in &contacts {
            if self.state == BattleState::Defeat {
                break;
            }
            let _ = self.enemy_reached_objective(id, ledger, events);
        }
        self.contacts = contacts;
    }

    /// Damage an enemy; defeating it pays its reward. Returns its remaining health.
    pub fn damage_enemy(
        &mut self,
        id: EnemyId,
        amount: f64,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) -> Result<f64, SimError> {
        if !self.enemies.contains_key(&id) {
            warn!(%id, "damage on unknown enemy");
            return Err(SimError::UnknownEnemy(id));
        }
        self.hit(id, amount, ledger, events)
            .ok_or(SimError::UnknownEnemy(id))
    }

    /// Remove a defeated enemy and pay its reward.
    pub fn enemy_defeated(
        &mut self,
        id: EnemyId,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) -> Result<(), SimError> {
        let enemy = self.remove_enemy(id)?;
        ledger.add_coins(enemy.reward_coins);
        ledger.add_souls(enemy.reward_souls);
        debug!(%id, kind = ?enemy.kind, coins = enemy.reward_coins, "enemy defeated");
        events.push(SimEvent::EnemyDefeated {
            id,
            coins: enemy.reward_coins,
            souls: enemy.reward_souls,
        });
        self.check_wave_complete(ledger, events);
        Ok(())
    }

    /// Apply an enemy's contact damage to the objective and remove it without reward.
    pub fn enemy_reached_objective(
        &mut self,
        id: EnemyId,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) -> Result<(), SimError> {
        let enemy = self.remove_enemy(id)?;
        let difficulty = self.difficulty();
        let damage = (enemy.damage * difficulty).max(0.0);
        self.objective.health = (self.objective.health - damage).max(0.0);
        debug!(%id, damage, objective = self.objective.health, "enemy reached objective");
        events.push(SimEvent::ObjectiveHealthChanged {
            health: self.objective.health,
            max_health: self.objective.max_health,
        });

        if self.objective.health <= 0.0 {
            self.state = BattleState::Defeat;
            self.pending.clear();
            info!(wave = self.wave_index, "objective destroyed");
            return Ok(());
        }
        self.check_wave_complete(ledger, events);
        Ok(())
    }

    /// Heal the objective by up to `hp`. Returns the amount actually restored.
    pub fn repair_objective(&mut self, hp: f64, events: &mut Vec<SimEvent>) -> f64 {
        if !hp.is_finite() || hp <= 0.0 {
            return 0.0;
        }
        let restored = hp.min(self.missing_objective_health());
        if restored > 0.0 {
            self.objective.health += restored;
            events.push(SimEvent::ObjectiveHealthChanged {
                health: self.objective.health,
                max_health: self.objective.max_health,
            });
        }
        restored
    }

    pub fn missing_objective_health(&self) -> f64 {
        (self.objective.max_health - self.objective.health).max(0.0)
    }

    /// Refresh a deployed defender after its roster unit changed.
    pub fn update_defender(&mut self, unit: &CapturedCreature) -> bool {
        let refreshed = systems::defenders::defender_for(unit);
        for (_entity, defender) in self.world.query_mut::<&mut Defender>() {
            if defender.unit == unit.unit {
                defender.attack = refreshed.attack;
                defender.range = refreshed.range;
                defender.attack_interval = refreshed.attack_interval;
                return true;
            }
        }
        false
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn wave_index(&self) -> u32 {
        self.wave_index
    }

    /// Difficulty of the current wave, 1.0 before the first one.
    pub fn difficulty(&self) -> f64 {
        self.current.as_ref().map_or(1.0, |w| w.difficulty)
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Seconds until the next wave starts on its own, while in `Setup`.
    pub fn countdown(&self) -> Option<f64> {
        (self.state == BattleState::Setup).then(|| self.countdown.max(0.0))
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Live enemy ids, ascending.
    pub fn enemy_ids(&self) -> Vec<EnemyId> {
        let mut ids: Vec<EnemyId> = self.enemies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn enemy_health(&self, id: EnemyId) -> Option<Health> {
        let entity = *self.enemies.get(&id)?;
        self.world.get::<&Health>(entity).ok().map(|h| *h)
    }

    pub fn defender_count(&self) -> usize {
        self.world.query::<&Defender>().iter().count()
    }

    pub fn view(&self) -> BattleView {
        BattleView {
            state: self.state,
            wave_index: self.wave_index,
            final_wave: self.config.final_wave,
            difficulty: self.difficulty(),
            objective_health: self.objective.health,
            objective_max_health: self.objective.max_health,
            enemies_pending: self.pending.len() as u32,
            enemies: systems::snapshot::build_enemies(&self.world),
        }
    }

    fn spawn_due(
        &mut self,
        dt: f64,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) {
        self.spawn_timer -= dt;
        while self.spawn_timer <= 0.0 {
            let Some(kind) = self.pending.pop_front() else {
                break;
            };
            self.spawn_enemy(kind, rng, content, events);
            self.spawn_timer += self.current.as_ref().map_or(
                self.config.enemy_spawn_interval,
                |w| w.spawn_interval,
            );
        }
        if self.pending.is_empty() {
            self.state = BattleState::Fighting;
        }
    }

    fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) -> EnemyId {
        let profile = content.enemy_profile(self.wave_index, kind);
        let difficulty = self.difficulty();
        let max_health = (profile.max_health * difficulty).max(1.0);
        let heading = DVec2::from_angle(rng.gen_range(0.0..TAU));
        let distance = self.config.enemy_path_length;

        let id = EnemyId(self.ids.next_raw());
        let entity = self.world.spawn((
            Enemy {
                id,
                kind,
                speed: profile.speed,
                damage: profile.damage,
                remaining_distance: distance,
                heading,
                reward_coins: profile.reward_coins,
                reward_souls: profile.reward_souls,
            },
            Health {
                current: max_health,
                max: max_health,
            },
            heading * distance,
        ));
        self.enemies.insert(id, entity);
        debug!(%id, ?kind, max_health, "enemy spawned");
        events.push(SimEvent::EnemySpawned { id, kind });
        id
    }

    /// Apply damage and resolve a kill. `None` if the enemy is gone.
    fn hit(
        &mut self,
        id: EnemyId,
        amount: f64,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) -> Option<f64> {
        let entity = *self.enemies.get(&id)?;
        let amount = if amount.is_finite() && amount > 0.0 {
            amount
        } else {
            0.0
        };
        let remaining = {
            let mut health = self.world.get::<&mut Health>(entity).ok()?;
            health.current = (health.current - amount).clamp(0.0, health.max);
            health.current
        };
        if remaining <= 0.0 {
            self.enemy_defeated(id, ledger, events).ok()?;
        }
        Some(remaining)
    }

    fn remove_enemy(&mut self, id: EnemyId) -> Result<Enemy, SimError> {
        let Some(entity) = self.enemies.remove(&id) else {
            warn!(%id, "enemy not found");
            return Err(SimError::UnknownEnemy(id));
        };
        let enemy = self
            .world
            .remove_one::<Enemy>(entity)
            .map_err(|_| SimError::UnknownEnemy(id))?;
        let _ = self.world.despawn(entity);
        Ok(enemy)
    }

    fn check_wave_complete(&mut self, ledger: &mut Ledger, events: &mut Vec<SimEvent>) {
        if self.state != BattleState::Fighting || !self.enemies.is_empty() {
            return;
        }
        let bonus = self
            .config
            .wave_clear_bonus_coins
            .saturating_mul(u64::from(self.wave_index));
        ledger.add_coins(bonus);
        info!(wave = self.wave_index, bonus, "wave completed");
        events.push(SimEvent::WaveCompleted {
            wave_index: self.wave_index,
            bonus_coins: bonus,
        });

        if self.wave_index >= self.config.final_wave {
            self.state = BattleState::Victory;
            info!(waves = self.wave_index, "final wave cleared");
        } else {
            self.state = BattleState::Setup;
            self.countdown = self.config.inter_wave_delay;
        }
    }
}
