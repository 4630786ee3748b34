//! Enumeration types used throughout the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordinal rarity classification of wild creatures.
///
/// Drives base stats, spawn weight and capture difficulty. The ordinal
/// (`index()`) is used directly by the drop tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RarityTier {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl RarityTier {
    /// All tiers, lowest first.
    pub const ALL: [RarityTier; 5] = [
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Legendary,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Tier for an ordinal, saturating at `Legendary`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

/// Enemy archetype in the defense phase, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline attacker.
    Grunt,
    /// Fast and fragile.
    Runner,
    /// Slow, heavy hitter.
    Brute,
    /// Tough all-rounder, appears in later waves.
    Elite,
    /// Milestone-wave leader.
    Boss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Grunt,
        EnemyKind::Runner,
        EnemyKind::Brute,
        EnemyKind::Elite,
        EnemyKind::Boss,
    ];
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    Victory,
    Defeat,
}

/// Top-level session phase. Owned by the session engine; only transitions mutate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseState {
    #[default]
    MainMenu,
    CapturePhase,
    DefensePhase,
    Shop,
    Settings,
    Paused,
    GameOver(SessionOutcome),
}

impl PhaseState {
    /// Phases in which `tick` advances a sub-engine.
    pub fn is_simulating(self) -> bool {
        matches!(self, PhaseState::CapturePhase | PhaseState::DefensePhase)
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseState::MainMenu => f.write_str("MainMenu"),
            PhaseState::CapturePhase => f.write_str("CapturePhase"),
            PhaseState::DefensePhase => f.write_str("DefensePhase"),
            PhaseState::Shop => f.write_str("Shop"),
            PhaseState::Settings => f.write_str("Settings"),
            PhaseState::Paused => f.write_str("Paused"),
            PhaseState::GameOver(SessionOutcome::Victory) => f.write_str("GameOver(Victory)"),
            PhaseState::GameOver(SessionOutcome::Defeat) => f.write_str("GameOver(Defeat)"),
        }
    }
}

/// Why a session was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatReason {
    /// Capture phase ended without a single captured creature.
    EmptyRoster,
    /// Objective health reached zero.
    ObjectiveDestroyed,
}

/// Defense-phase battle lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    /// Not deployed (capture phase or menus).
    #[default]
    Idle,
    /// Counting down to the next wave (initial setup or inter-wave delay).
    Setup,
    /// Wave announced, enemies still spawning.
    WaveStart,
    /// Every enemy of the wave has spawned; resolving.
    Fighting,
    /// Final wave cleared.
    Victory,
    /// Objective destroyed.
    Defeat,
}

impl BattleState {
    pub fn wave_in_progress(self) -> bool {
        matches!(self, BattleState::WaveStart | BattleState::Fighting)
    }

    pub fn is_over(self) -> bool {
        matches!(self, BattleState::Victory | BattleState::Defeat)
    }
}

/// What happens to a wild creature after a failed capture roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFailurePolicy {
    /// The creature flees and is destroyed without drops.
    #[default]
    Escape,
    /// The creature stays alive and capturable for another attempt.
    Retry,
}

/// Player currencies held by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Coins,
    Gems,
    Souls,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Coins => f.write_str("coins"),
            Currency::Gems => f.write_str("gems"),
            Currency::Souls => f.write_str("souls"),
        }
    }
}
