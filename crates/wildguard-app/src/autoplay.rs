//! Scripted player for headless runs.
//!
//! Reads each snapshot and answers with commands: weakens and captures wild
//! creatures until the roster is big enough, taps the enemy closest to the
//! objective during waves and spends currency in the shop between waves.

use wildguard_core::commands::{SessionCommand, ShopItem};
use wildguard_core::economy::CostTable;
use wildguard_core::enums::{BattleState, PhaseState};
use wildguard_core::state::SessionSnapshot;

/// Fraction of max health removed per hit: two hits leave a creature capturable.
const WILD_HIT_FRACTION: f64 = 0.36;

#[derive(Debug, Clone)]
pub struct Autoplay {
    sessions_started: u32,
    max_sessions: u32,
    /// Roster size at which the capture phase is cut short.
    roster_target: usize,
    tap_damage: f64,
    costs: CostTable,
    /// Wave index of the last shop visit, one visit per break.
    last_shop_wave: Option<u32>,
}

impl Autoplay {
    pub fn new(costs: CostTable) -> Self {
        Self {
            sessions_started: 0,
            max_sessions: 1,
            roster_target: 4,
            tap_damage: 5.0,
            costs,
            last_shop_wave: None,
        }
    }

    pub fn with_roster_target(mut self, target: usize) -> Self {
        self.roster_target = target.max(1);
        self
    }

    /// Commands to queue before the next tick.
    pub fn plan(&mut self, snapshot: &SessionSnapshot) -> Vec<SessionCommand> {
        match snapshot.phase {
            PhaseState::MainMenu | PhaseState::GameOver(_)
                if self.sessions_started < self.max_sessions =>
            {
                self.sessions_started += 1;
                self.last_shop_wave = None;
                vec![SessionCommand::StartSession]
            }
            PhaseState::CapturePhase => self.plan_capture(snapshot),
            PhaseState::DefensePhase => self.plan_defense(snapshot),
            _ => Vec::new(),
        }
    }

    /// The last session has ended.
    pub fn is_done(&self, snapshot: &SessionSnapshot) -> bool {
        matches!(snapshot.phase, PhaseState::GameOver(_))
            && self.sessions_started >= self.max_sessions
    }

    fn plan_capture(&self, snapshot: &SessionSnapshot) -> Vec<SessionCommand> {
        if snapshot.roster.len() >= self.roster_target {
            return vec![SessionCommand::ForceTransition {
                target: PhaseState::DefensePhase,
            }];
        }
        let assist = snapshot
            .roster
            .iter()
            .max_by_key(|u| u.level)
            .map(|u| u.unit);

        snapshot
            .wild
            .first()
            .map(|wild| {
                if wild.capturable {
                    SessionCommand::AttemptCapture {
                        id: wild.id,
                        assist,
                    }
                } else {
                    SessionCommand::DamageWild {
                        id: wild.id,
                        amount: wild.max_health * WILD_HIT_FRACTION,
                    }
                }
            })
            .into_iter()
            .collect()
    }

    fn plan_defense(&mut self, snapshot: &SessionSnapshot) -> Vec<SessionCommand> {
        let battle = &snapshot.battle;
        let mut commands = Vec::new();

        if battle.state == BattleState::Setup && self.last_shop_wave != Some(battle.wave_index) {
            self.last_shop_wave = Some(battle.wave_index);
            let purchases = self.shopping_list(snapshot);
            if !purchases.is_empty() {
                commands.push(SessionCommand::Pause);
                commands.push(SessionCommand::ForceTransition {
                    target: PhaseState::Shop,
                });
                commands.extend(
                    purchases
                        .into_iter()
                        .map(|item| SessionCommand::Purchase { item }),
                );
                commands.push(SessionCommand::ForceTransition {
                    target: PhaseState::Paused,
                });
                commands.push(SessionCommand::Resume);
            }
        }

        if let Some(enemy) = battle
            .enemies
            .iter()
            .min_by(|a, b| a.remaining_distance.total_cmp(&b.remaining_distance))
        {
            commands.push(SessionCommand::DamageEnemy {
                id: enemy.id,
                amount: self.tap_damage,
            });
        }
        commands
    }

    fn shopping_list(&self, snapshot: &SessionSnapshot) -> Vec<ShopItem> {
        let mut items = Vec::new();
        let battle = &snapshot.battle;
        let missing = (battle.objective_max_health - battle.objective_health).max(0.0);
        if missing > battle.objective_max_health * 0.5 && self.costs.repair_cost_per_hp > 0 {
            let affordable = snapshot.wallet.coins / self.costs.repair_cost_per_hp;
            let hp = (missing.floor() as u64).min(affordable).min(u64::from(u32::MAX)) as u32;
            if hp > 0 {
                items.push(ShopItem::RepairObjective { hp });
            }
        }

        if let Some(unit) = snapshot.roster.iter().min_by_key(|u| u.level) {
            let cost = self.costs.upgrade_souls_per_level * f64::from(unit.level);
            if snapshot.wallet.souls >= cost {
                items.push(ShopItem::UpgradeUnit { unit: unit.unit });
            }
        }
        items
    }
}
