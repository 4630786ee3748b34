//! Session roster: creatures the player captured this session.

use wildguard_core::components::{CapturedCreature, CreatureStats};
use wildguard_core::enums::RarityTier;
use wildguard_core::state::UnitView;
use wildguard_core::types::{IdAllocator, UnitId, WildId};

#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<CapturedCreature>,
    ids: IdAllocator,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a captured creature at level 1.
    pub fn enroll(&mut self, origin: WildId, tier: RarityTier, stats: CreatureStats) -> UnitId {
        let unit = UnitId(self.ids.next_raw());
        self.units.push(CapturedCreature {
            unit,
            origin,
            tier,
            stats,
            level: 1,
        });
        unit
    }

    pub fn get(&self, unit: UnitId) -> Option<&CapturedCreature> {
        self.units.iter().find(|c| c.unit == unit)
    }

    pub fn get_mut(&mut self, unit: UnitId) -> Option<&mut CapturedCreature> {
        self.units.iter_mut().find(|c| c.unit == unit)
    }

    pub fn level_of(&self, unit: UnitId) -> Option<u32> {
        self.get(unit).map(|c| c.level)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedCreature> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Drop every unit. Ids keep counting so none is ever reused.
    pub fn clear(&mut self) {
        self.units.clear();
    }

    pub fn views(&self) -> Vec<UnitView> {
        self.units
            .iter()
            .map(|c| UnitView {
                unit: c.unit,
                tier: c.tier,
                level: c.level,
                attack: crate::systems::defenders::defender_attack(c),
            })
            .collect()
    }
}
