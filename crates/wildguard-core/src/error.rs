//! Error taxonomy for recoverable simulation failures.
//!
//! Every variant leaves the simulation state unchanged. Normal gameplay
//! outcomes (a failed capture roll, an enemy hitting the objective, the capture
//! timer running out) are reported as values and events, never as errors.
//! Fatal configuration problems use [`crate::config::ConfigError`] instead.

use thiserror::Error;

use crate::enums::{Currency, PhaseState};
use crate::types::{EnemyId, UnitId, WildId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("{0} does not exist or was already destroyed")]
    UnknownWild(WildId),
    #[error("{0} does not exist or was already removed")]
    UnknownEnemy(EnemyId),
    #[error("{0} is not in the roster")]
    UnknownUnit(UnitId),
    #[error("{0} is not capturable yet")]
    NotCapturable(WildId),
    #[error("cannot transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: PhaseState,
        to: PhaseState,
        reason: &'static str,
    },
    #[error("wave {wave_index} is still in progress")]
    WaveInProgress { wave_index: u32 },
    #[error("the battle is already over")]
    BattleOver,
    #[error("operation requires {expected}, current phase is {actual}")]
    WrongPhase {
        expected: PhaseState,
        actual: PhaseState,
    },
    #[error("not enough {currency}: need {needed}, have {available}")]
    InsufficientFunds {
        currency: Currency,
        needed: f64,
        available: f64,
    },
}
