//! Session configuration.
//!
//! Loaded once at session start and validated before any engine is built.
//! A configuration that fails validation is fatal: the simulation cannot
//! produce meaningful behaviour with non-positive timings or counts.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MIN_SUBSTEP;
use crate::economy::CostTable;
use crate::enums::CaptureFailurePolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// RNG seed. Same seed and inputs = same session.
    pub seed: u64,

    // --- Capture phase ---
    /// Length of the capture phase in seconds.
    pub capture_phase_duration: f64,
    pub max_wild_entities: u32,
    /// Seconds between wild spawns.
    pub spawn_interval: f64,
    /// Seconds a wild creature lingers before despawning.
    pub wild_despawn_time: f64,
    /// Wild creatures spawn inside `[-e, e]²`.
    pub spawn_area_half_extent: f64,
    /// Spawn weights per rarity tier, lowest tier first.
    pub rarity_weights: [u32; 5],
    pub base_capture_rate: f64,
    pub capture_failure_policy: CaptureFailurePolicy,

    // --- Defense phase ---
    pub wave_base_count: u32,
    pub wave_count_increment: u32,
    pub difficulty_rate: f64,
    /// Clearing this wave wins the session.
    pub final_wave: u32,
    /// Seconds between entering the defense phase and wave 1.
    pub setup_delay: f64,
    pub inter_wave_delay: f64,
    /// Seconds between enemy spawns within a wave.
    pub enemy_spawn_interval: f64,
    /// Distance enemies spawn from the objective.
    pub enemy_path_length: f64,
    /// Distance at which an enemy hits the objective.
    pub enemy_attack_range: f64,
    /// First wave whose enemy kinds are drawn by weight instead of fixed rules.
    pub weighted_composition_from_wave: u32,
    pub objective_max_health: f64,
    pub wave_clear_bonus_coins: u64,
    pub victory_gems: u64,

    // --- Stepping ---
    /// Largest simulated step; bigger `dt` values are sub-stepped.
    pub max_substep: f64,

    pub costs: CostTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            capture_phase_duration: 300.0,
            max_wild_entities: 8,
            spawn_interval: 5.0,
            wild_despawn_time: 90.0,
            spawn_area_half_extent: 50.0,
            rarity_weights: [40, 30, 15, 10, 5],
            base_capture_rate: 0.3,
            capture_failure_policy: CaptureFailurePolicy::Escape,
            wave_base_count: 5,
            wave_count_increment: 2,
            difficulty_rate: 0.1,
            final_wave: 10,
            setup_delay: 5.0,
            inter_wave_delay: 8.0,
            enemy_spawn_interval: 1.0,
            enemy_path_length: 60.0,
            enemy_attack_range: 1.5,
            weighted_composition_from_wave: 6,
            objective_max_health: 1000.0,
            wave_clear_bonus_coins: 10,
            victory_gems: 5,
            max_substep: 0.1,
            costs: CostTable::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Reject configurations the simulation cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("capture_phase_duration", self.capture_phase_duration)?;
        positive("spawn_interval", self.spawn_interval)?;
        positive("wild_despawn_time", self.wild_despawn_time)?;
        positive("spawn_area_half_extent", self.spawn_area_half_extent)?;
        positive("setup_delay", self.setup_delay)?;
        positive("inter_wave_delay", self.inter_wave_delay)?;
        positive("enemy_spawn_interval", self.enemy_spawn_interval)?;
        positive("enemy_path_length", self.enemy_path_length)?;
        positive("enemy_attack_range", self.enemy_attack_range)?;
        positive("objective_max_health", self.objective_max_health)?;
        positive("max_substep", self.max_substep)?;
        in_range("max_substep", self.max_substep, MIN_SUBSTEP, f64::MAX)?;
        positive("max_wild_entities", f64::from(self.max_wild_entities))?;
        positive("wave_base_count", f64::from(self.wave_base_count))?;
        positive("final_wave", f64::from(self.final_wave))?;
        positive(
            "weighted_composition_from_wave",
            f64::from(self.weighted_composition_from_wave),
        )?;

        in_range("base_capture_rate", self.base_capture_rate, 0.0, 1.0)?;
        in_range("difficulty_rate", self.difficulty_rate, 0.0, f64::MAX)?;
        in_range(
            "costs.upgrade_souls_per_level",
            self.costs.upgrade_souls_per_level,
            0.0,
            f64::MAX,
        )?;

        if self.rarity_weights.iter().all(|&w| w == 0) {
            return Err(ConfigError::RarityWeights);
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse session config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read session config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("rarity weights must not all be zero")]
    RarityWeights,
}
