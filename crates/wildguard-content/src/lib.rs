//! Built-in content tables for WILDGUARD.
//!
//! Consolidates per-tier creature templates and per-kind enemy profiles
//! behind the [`ContentLookup`] trait so the simulation can be fed other
//! tables in tests or by a data-driven content layer.

pub mod creatures;
pub mod enemies;

pub use wildguard_core as core;

use wildguard_core::content::{ContentLookup, CreatureTemplate, EnemyProfile};
use wildguard_core::enums::{EnemyKind, RarityTier};

/// The shipped content tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinContent;

impl ContentLookup for BuiltinContent {
    fn creature_template(&self, tier: RarityTier) -> CreatureTemplate {
        creatures::get_template(tier)
    }

    fn enemy_profile(&self, wave_index: u32, kind: EnemyKind) -> EnemyProfile {
        enemies::get_profile(wave_index, kind)
    }
}
