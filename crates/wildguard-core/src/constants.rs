//! Simulation constants and tuning parameters.
//!
//! Values that a session may tune live in `SessionConfig`; the ones here are
//! fixed rules of the game.

// --- Capture ---

/// Health fraction at or below which a wild creature becomes capturable.
pub const CAPTURABLE_HEALTH_RATIO: f64 = 0.30;

/// Weight of missing health in the capture probability.
pub const CAPTURE_WEAKNESS_WEIGHT: f64 = 0.4;

/// Capture probability floor.
pub const CAPTURE_CHANCE_MIN: f64 = 0.05;

/// Capture probability ceiling.
pub const CAPTURE_CHANCE_MAX: f64 = 0.95;

/// Capture bonus per level of the assisting roster unit.
pub const ASSIST_BONUS_PER_LEVEL: f64 = 0.02;

/// Per-instance stat variance applied on spawn (± fraction).
pub const WILD_STAT_VARIANCE: f64 = 0.10;

// --- Capture drops ---

pub const CAPTURE_COINS_MIN: u64 = 20;
pub const CAPTURE_COINS_MAX: u64 = 50;
/// Extra coins per tier step on capture.
pub const CAPTURE_COINS_PER_TIER: u64 = 10;
pub const CAPTURE_SOUL_CHANCE_BASE: f64 = 0.3;
pub const CAPTURE_SOUL_CHANCE_PER_TIER: f64 = 0.1;
pub const CAPTURE_EGG_CHANCE_BASE: f64 = 0.05;
pub const CAPTURE_EGG_CHANCE_PER_TIER: f64 = 0.05;
pub const CAPTURE_MATERIAL_CHANCE_BASE: f64 = 0.2;
pub const CAPTURE_MATERIAL_CHANCE_PER_TIER: f64 = 0.05;
pub const CAPTURE_MATERIALS_MIN: u32 = 1;
pub const CAPTURE_MATERIALS_MAX: u32 = 3;

// --- Death drops (strictly below the capture table) ---

pub const DEATH_COINS_MIN: u64 = 5;
pub const DEATH_COINS_MAX: u64 = 15;
pub const DEATH_SOUL_CHANCE_BASE: f64 = 0.1;
pub const DEATH_SOUL_CHANCE_PER_TIER: f64 = 0.05;
/// Fraction of the capture soul amount granted on death.
pub const DEATH_SOUL_AMOUNT_FACTOR: f64 = 0.5;

// --- Ticking ---

/// Upper bound on substeps in one `tick`; larger `dt`s widen each step.
pub const MAX_SUBSTEPS_PER_TICK: u32 = 100_000;

/// Smallest accepted `max_substep`.
pub const MIN_SUBSTEP: f64 = 1e-6;

// --- Defense ---

/// Radius of the ring on which defenders are deployed around the objective.
pub const DEFENDER_RING_RADIUS: f64 = 3.0;

/// Base reach of a deployed defender.
pub const DEFENDER_BASE_RANGE: f64 = 20.0;

/// Extra reach per rarity tier.
pub const DEFENDER_RANGE_PER_TIER: f64 = 2.0;

/// Seconds between strikes for a defender with zero speed.
pub const DEFENDER_BASE_ATTACK_INTERVAL: f64 = 1.5;

/// Attack multiplier gained per unit level above 1.
pub const DEFENDER_ATTACK_PER_LEVEL: f64 = 0.1;

// --- Wave composition ---

/// Every n-th wave opens with a boss.
pub const BOSS_WAVE_PERIOD: u32 = 10;

/// First wave in which runners appear in the deterministic composition.
pub const RUNNER_FIRST_WAVE: u32 = 3;

/// First wave in which brutes appear in the deterministic composition.
pub const BRUTE_FIRST_WAVE: u32 = 5;
