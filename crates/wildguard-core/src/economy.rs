//! Player currency ledger.
//!
//! The ledger is owned by the session engine and lent by `&mut` to whichever
//! sub-engine is active. Balances can only change through the methods below;
//! spends never drive a balance negative.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Cost table for shop actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTable {
    /// Coins per objective hit point repaired.
    pub repair_cost_per_hp: u64,
    /// Souls per current level when upgrading a roster unit.
    pub upgrade_souls_per_level: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            repair_cost_per_hp: 2,
            upgrade_souls_per_level: 5.0,
        }
    }
}

/// Rewards produced by a capture or a kill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DropSet {
    pub coins: u64,
    pub souls: f64,
    pub eggs: u32,
    pub materials: u32,
}

/// Currency balances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    coins: u64,
    gems: u64,
    souls: f64,
    eggs: u32,
    materials: u32,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with starting balances.
    pub fn with_balances(coins: u64, gems: u64, souls: f64) -> Self {
        let mut ledger = Self {
            coins,
            gems,
            ..Self::default()
        };
        ledger.add_souls(souls);
        ledger
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn gems(&self) -> u64 {
        self.gems
    }

    pub fn souls(&self) -> f64 {
        self.souls
    }

    pub fn eggs(&self) -> u32 {
        self.eggs
    }

    pub fn materials(&self) -> u32 {
        self.materials
    }

    pub fn add_coins(&mut self, n: u64) {
        self.coins = self.coins.saturating_add(n);
    }

    /// Returns `false` and leaves the balance untouched when `n` exceeds it.
    pub fn spend_coins(&mut self, n: u64) -> bool {
        match self.coins.checked_sub(n) {
            Some(rest) => {
                self.coins = rest;
                true
            }
            None => false,
        }
    }

    pub fn add_gems(&mut self, n: u64) {
        self.gems = self.gems.saturating_add(n);
    }

    pub fn spend_gems(&mut self, n: u64) -> bool {
        match self.gems.checked_sub(n) {
            Some(rest) => {
                self.gems = rest;
                true
            }
            None => false,
        }
    }

    /// Negative or non-finite amounts are ignored.
    pub fn add_souls(&mut self, amount: f64) {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "rejected soul credit");
            return;
        }
        self.souls += amount;
    }

    pub fn spend_souls(&mut self, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            warn!(amount, "rejected soul debit");
            return false;
        }
        if amount > self.souls {
            return false;
        }
        self.souls -= amount;
        true
    }

    pub fn add_eggs(&mut self, n: u32) {
        self.eggs = self.eggs.saturating_add(n);
    }

    pub fn add_materials(&mut self, n: u32) {
        self.materials = self.materials.saturating_add(n);
    }

    /// Credit every part of a drop set.
    pub fn apply_drops(&mut self, drops: &DropSet) {
        self.add_coins(drops.coins);
        self.add_souls(drops.souls);
        self.add_eggs(drops.eggs);
        self.add_materials(drops.materials);
    }
}
