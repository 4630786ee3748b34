//! Wild entity registry: the capture phase's creature set.
//!
//! Owns a hecs world of wild creatures and runs their lifecycle: timed
//! spawning, weakening, capture resolution and despawn. Every creature leaves
//! the world exactly once, through death, capture, escape or timeout.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use wildguard_core::components::{CreatureStats, DespawnTimer, Health, WildCreature};
use wildguard_core::config::{ConfigError, SessionConfig};
use wildguard_core::constants::{CAPTURABLE_HEALTH_RATIO, WILD_STAT_VARIANCE};
use wildguard_core::content::ContentLookup;
use wildguard_core::economy::{DropSet, Ledger};
use wildguard_core::enums::{CaptureFailurePolicy, RarityTier};
use wildguard_core::error::SimError;
use wildguard_core::events::SimEvent;
use wildguard_core::state::WildView;
use wildguard_core::types::{IdAllocator, Position, UnitId, WildId};

use crate::capture::{capture_chance, roll_capture_drops, roll_death_drops};
use crate::roster::Roster;

/// Result of [`WildEntityRegistry::apply_damage`].
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub remaining_health: f64,
    /// The capturable flag flipped during this call.
    pub became_capturable: bool,
    pub died: bool,
    /// Death drops, present only when `died`.
    pub drops: Option<DropSet>,
}

/// Result of a capture attempt that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Creature joined the roster as `unit`.
    Captured {
        unit: UnitId,
        chance: f64,
        drops: DropSet,
    },
    /// Roll failed; creature fled and was destroyed without drops.
    Escaped { chance: f64 },
    /// Roll failed; creature stays capturable.
    Resisted { chance: f64 },
}

impl CaptureOutcome {
    pub fn chance(&self) -> f64 {
        match self {
            CaptureOutcome::Captured { chance, .. }
            | CaptureOutcome::Escaped { chance }
            | CaptureOutcome::Resisted { chance } => *chance,
        }
    }
}

pub struct WildEntityRegistry {
    world: World,
    index: HashMap<WildId, Entity>,
    ids: IdAllocator,
    rarity: WeightedIndex<u32>,
    /// Seconds until the next spawn; stays at 0 while the field is full.
    spawn_timer: f64,
    max_entities: usize,
    spawn_interval: f64,
    despawn_time: f64,
    half_extent: f64,
    base_capture_rate: f64,
    failure_policy: CaptureFailurePolicy,
    despawn_buffer: Vec<WildId>,
}

impl WildEntityRegistry {
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigError> {
        let rarity =
            WeightedIndex::new(config.rarity_weights).map_err(|_| ConfigError::RarityWeights)?;
        Ok(Self {
            world: World::new(),
            index: HashMap::new(),
            ids: IdAllocator::default(),
            rarity,
            spawn_timer: 0.0,
            max_entities: config.max_wild_entities as usize,
            spawn_interval: config.spawn_interval,
            despawn_time: config.wild_despawn_time,
            half_extent: config.spawn_area_half_extent,
            base_capture_rate: config.base_capture_rate,
            failure_policy: config.capture_failure_policy,
            despawn_buffer: Vec::new(),
        })
    }

    /// Remove every creature and restart the spawn cadence. Ids keep counting.
    pub fn reset(&mut self) {
        if !self.index.is_empty() {
            debug!(cleared = self.index.len(), "wild registry reset");
        }
        self.world.clear();
        self.index.clear();
        self.spawn_timer = 0.0;
    }

    /// Despawn expired creatures, then spawn new ones.
    pub fn tick(
        &mut self,
        dt: f64,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) {
        self.despawn_tick(dt, events);
        self.spawn_tick(dt, rng, content, events);
    }

    /// Spawn at the configured cadence while below the population cap.
    /// Returns how many creatures were spawned.
    pub fn spawn_tick(
        &mut self,
        dt: f64,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) -> usize {
        self.spawn_timer -= dt;
        let mut spawned = 0;
        while self.spawn_timer <= 0.0 {
            if self.index.len() >= self.max_entities {
                self.spawn_timer = 0.0;
                break;
            }
            let tier = RarityTier::from_index(self.rarity.sample(rng));
            let e = self.half_extent;
            let position = Position::new(rng.gen_range(-e..=e), rng.gen_range(-e..=e));
            self.spawn_with_tier(tier, position, rng, content, events);
            self.spawn_timer += self.spawn_interval;
            spawned += 1;
        }
        spawned
    }

    /// Spawn one creature of a given tier, bypassing cadence and cap.
    pub fn spawn_with_tier(
        &mut self,
        tier: RarityTier,
        position: Position,
        rng: &mut ChaCha8Rng,
        content: &dyn ContentLookup,
        events: &mut Vec<SimEvent>,
    ) -> WildId {
        let template = content.creature_template(tier);
        let variance = rng.gen_range(1.0 - WILD_STAT_VARIANCE..=1.0 + WILD_STAT_VARIANCE);
        let scale = template.stat_coefficient * variance;
        let base = template.base;
        let stats = CreatureStats {
            attack: base.attack * scale,
            defense: base.defense * scale,
            speed: base.speed * scale,
            max_health: (base.max_health * scale).max(1.0),
            divine_power: base.divine_power * scale,
            absorption_rate: base.absorption_rate,
        };

        let id = WildId(self.ids.next_raw());
        let entity = self.world.spawn((
            WildCreature {
                id,
                tier,
                stats,
                capture_difficulty: template.capture_difficulty,
                capturable: false,
            },
            Health {
                current: stats.max_health,
                max: stats.max_health,
            },
            DespawnTimer {
                remaining_secs: self.despawn_time,
            },
            position,
        ));
        self.index.insert(id, entity);

        debug!(%id, ?tier, max_health = stats.max_health, "wild creature spawned");
        events.push(SimEvent::WildSpawned { id, tier, position });
        id
    }

    /// Count down every despawn timer; expired creatures leave with no drops.
    pub fn despawn_tick(&mut self, dt: f64, events: &mut Vec<SimEvent>) -> usize {
        self.despawn_buffer.clear();
        for (_entity, (creature, timer)) in self
            .world
            .query_mut::<(&WildCreature, &mut DespawnTimer)>()
        {
            timer.remaining_secs -= dt;
            if timer.remaining_secs <= 0.0 {
                self.despawn_buffer.push(creature.id);
            }
        }
        self.despawn_buffer.sort_unstable();

        let expired = std::mem::take(&mut self.despawn_buffer);
        for &id in &expired {
            if self.destroy(id) {
                debug!(%id, "wild creature despawned");
                events.push(SimEvent::WildDespawned { id });
            }
        }
        let count = expired.len();
        self.despawn_buffer = expired;
        count
    }

    /// Reduce a creature's health. Killing it pays the death drops.
    pub fn apply_damage(
        &mut self,
        id: WildId,
        amount: f64,
        rng: &mut ChaCha8Rng,
        ledger: &mut Ledger,
        events: &mut Vec<SimEvent>,
    ) -> Result<DamageReport, SimError> {
        let entity = self.lookup(id)?;
        let amount = if amount.is_finite() && amount > 0.0 {
            amount
        } else {
            0.0
        };

        let (tier, remaining, became_capturable) = {
            let (creature, health) = self
                .world
                .query_one_mut::<(&mut WildCreature, &mut Health)>(entity)
                .map_err(|_| SimError::UnknownWild(id))?;
            health.current = (health.current - amount).clamp(0.0, health.max);
            let crossed = health.current > 0.0
                && !creature.capturable
                && health.current <= CAPTURABLE_HEALTH_RATIO * health.max;
            if crossed {
                creature.capturable = true;
            }
            (creature.tier, health.current, crossed)
        };

        if remaining <= 0.0 {
            let drops = roll_death_drops(tier, rng);
            ledger.apply_drops(&drops);
            self.destroy(id);
            debug!(%id, coins = drops.coins, souls = drops.souls, "wild creature killed");
            events.push(SimEvent::WildKilled { id, drops });
            return Ok(DamageReport {
                remaining_health: 0.0,
                became_capturable: false,
                died: true,
                drops: Some(drops),
            });
        }

        if became_capturable {
            events.push(SimEvent::WildBecameCapturable { id });
        }
        Ok(DamageReport {
            remaining_health: remaining,
            became_capturable,
            died: false,
            drops: None,
        })
    }

    /// Roll a capture. Rejected without touching the RNG unless the creature is capturable.
    pub fn attempt_capture(
        &mut self,
        id: WildId,
        assist_level: Option<u32>,
        rng: &mut ChaCha8Rng,
        ledger: &mut Ledger,
        roster: &mut Roster,
        events: &mut Vec<SimEvent>,
    ) -> Result<CaptureOutcome, SimError> {
        let entity = self.lookup(id)?;
        let (tier, stats, chance) = {
            let (creature, health) = self
                .world
                .query_one_mut::<(&WildCreature, &Health)>(entity)
                .map_err(|_| SimError::UnknownWild(id))?;
            if !creature.capturable {
                debug!(%id, "capture rejected, not weakened enough");
                return Err(SimError::NotCapturable(id));
            }
            let ratio = if health.max > 0.0 {
                health.current / health.max
            } else {
                0.0
            };
            let chance = capture_chance(
                self.base_capture_rate,
                ratio,
                creature.capture_difficulty,
                assist_level,
            );
            (creature.tier, creature.stats, chance)
        };

        let roll: f64 = rng.gen();
        if roll < chance {
            let drops = roll_capture_drops(tier, rng);
            ledger.apply_drops(&drops);
            self.destroy(id);
            let unit = roster.enroll(id, tier, stats);
            debug!(%id, %unit, chance, roll, "wild creature captured");
            events.push(SimEvent::WildCaptured {
                id,
                unit,
                chance,
                drops,
            });
            return Ok(CaptureOutcome::Captured {
                unit,
                chance,
                drops,
            });
        }

        match self.failure_policy {
            CaptureFailurePolicy::Escape => {
                self.destroy(id);
                debug!(%id, chance, roll, "wild creature escaped");
                events.push(SimEvent::WildEscaped { id, chance });
                Ok(CaptureOutcome::Escaped { chance })
            }
            CaptureFailurePolicy::Retry => {
                debug!(%id, chance, roll, "wild creature resisted capture");
                events.push(SimEvent::WildResisted { id, chance });
                Ok(CaptureOutcome::Resisted { chance })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: WildId) -> bool {
        self.index.contains_key(&id)
    }

    /// Live ids, ascending.
    pub fn ids(&self) -> Vec<WildId> {
        let mut ids: Vec<WildId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn health(&self, id: WildId) -> Option<Health> {
        let entity = *self.index.get(&id)?;
        self.world.get::<&Health>(entity).ok().map(|h| *h)
    }

    pub fn is_capturable(&self, id: WildId) -> Option<bool> {
        let entity = *self.index.get(&id)?;
        self.world
            .get::<&WildCreature>(entity)
            .ok()
            .map(|c| c.capturable)
    }

    pub fn tier(&self, id: WildId) -> Option<RarityTier> {
        let entity = *self.index.get(&id)?;
        self.world.get::<&WildCreature>(entity).ok().map(|c| c.tier)
    }

    /// Seconds until the next spawn attempt.
    pub fn spawn_timer(&self) -> f64 {
        self.spawn_timer
    }

    pub fn views(&self) -> Vec<WildView> {
        let mut views: Vec<WildView> = self
            .world
            .query::<(&WildCreature, &Health, &DespawnTimer, &Position)>()
            .iter()
            .map(|(_, (creature, health, timer, pos))| WildView {
                id: creature.id,
                tier: creature.tier,
                position: *pos,
                health: health.current,
                max_health: health.max,
                capturable: creature.capturable,
                despawn_in_secs: timer.remaining_secs.max(0.0),
            })
            .collect();
        views.sort_by_key(|v| v.id);
        views
    }

    fn lookup(&self, id: WildId) -> Result<Entity, SimError> {
        match self.index.get(&id) {
            Some(&entity) => Ok(entity),
            None => {
                warn!(%id, "wild creature not found");
                Err(SimError::UnknownWild(id))
            }
        }
    }

    fn destroy(&mut self, id: WildId) -> bool {
        match self.index.remove(&id) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }
}
