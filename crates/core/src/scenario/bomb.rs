//! Manufactorum Raid: bomb sites, the accelerating detonation timer and the
//! plant / disarm / rearm actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ScenarioCtx;
use super::registry::{BombRules, Scenario};
use crate::error::BattlefieldError;
use crate::log::BattleEvent;
use crate::outcome::{ActionOutcome, DisarmResult, Rejection};
use crate::state::{Cell, Grid};
use crate::terrain::glyphs;
use crate::types::{Faction, Pos, VictoryCheck};

const PLACEMENT_ATTEMPTS: u32 = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub x: i32,
    pub y: i32,
    pub planted: bool,
    pub armed: bool,
    pub counter: u32,
    pub exploded: bool,
}

impl Bomb {
    pub fn unplanted(pos: Pos) -> Self {
        Self { x: pos.x, y: pos.y, planted: false, armed: false, counter: 0, exploded: false }
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    /// Armed and still counting down.
    pub fn is_live(&self) -> bool {
        self.armed && !self.exploded
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerTick {
    Dormant,
    Advance { counter: u32 },
    Detonate,
}

/// End-of-round timer step for one bomb given its d6 roll.
pub fn tick_with_roll(bomb: &Bomb, roll: i32, threshold: i32) -> TimerTick {
    if !bomb.is_live() {
        return TimerTick::Dormant;
    }
    if roll + bomb.counter as i32 >= threshold {
        TimerTick::Detonate
    } else {
        TimerTick::Advance { counter: bomb.counter + 1 }
    }
}

/// Resolves a disarm attempt from its check roll and tiebreak roll. A failed
/// check with matching dice is a critical failure.
pub fn disarm_with_rolls(check: i32, tiebreak: i32, target: i32) -> DisarmResult {
    if check >= target {
        DisarmResult::Disarmed
    } else if check == tiebreak {
        DisarmResult::CriticalFailure { roll: check }
    } else {
        DisarmResult::Failed { roll: check }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BombAction {
    Plant,
    Disarm,
    Rearm,
}

impl BombAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BombAction::Plant => "plantBomb",
            BombAction::Disarm => "disarmBomb",
            BombAction::Rearm => "rearmBomb",
        }
    }
}

impl fmt::Display for BombAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BombAction {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "plantBomb" | "plant" => Ok(BombAction::Plant),
            "disarmBomb" | "disarm" => Ok(BombAction::Disarm),
            "rearmBomb" | "rearm" => Ok(BombAction::Rearm),
            other => Err(other.to_string()),
        }
    }
}

/// Bomb list for one raid. Persisted through the top-level `bombs` field of
/// a save, not inside the scenario state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaidState {
    #[serde(skip)]
    pub bombs: Vec<Bomb>,
}

impl RaidState {
    pub(super) fn setup(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &BombRules) {
        ctx.log.push(BattleEvent::Briefing(
            "SCENARIO: MANUFACTORUM RAID. Plant explosives on critical machinery!".to_string(),
        ));
        self.bombs.clear();

        let (width, height) = (ctx.grid.width() as i32, ctx.grid.height() as i32);
        let baseline = height - 4;
        let mut attempts = 0;
        while self.bombs.len() < rules.count && attempts < PLACEMENT_ATTEMPTS {
            attempts += 1;
            let x = ctx.rng.range(5, width - 5);
            let y = ctx.rng.range(5, height / 2);
            let pos = Pos::new(x, y);

            let clear_of_attackers = (y - baseline).abs() >= rules.min_distance_from_attacker;
            let spaced = self
                .bombs
                .iter()
                .all(|bomb| bomb.pos().distance(pos) >= rules.min_distance_between_bombs);
            if clear_of_attackers && spaced && ctx.grid.is_valid_spawn(pos) {
                ctx.grid.set(pos, Cell::bomb_site(self.bombs.len()));
                self.bombs.push(Bomb::unplanted(pos));
            }
        }
        ctx.log.push(BattleEvent::BombSitesMarked { count: self.bombs.len() });
    }

    pub fn bomb(&self, index: usize) -> Result<&Bomb, BattlefieldError> {
        self.bombs.get(index).ok_or(BattlefieldError::BombIndex { index, count: self.bombs.len() })
    }

    pub fn exploded_count(&self) -> usize {
        self.bombs.iter().filter(|bomb| bomb.exploded).count()
    }

    pub(crate) fn apply(
        &mut self,
        ctx: &mut ScenarioCtx<'_>,
        action: BombAction,
        index: usize,
        rules: &BombRules,
    ) -> Result<ActionOutcome, BattlefieldError> {
        let bomb = self.bomb(index)?.clone();
        if bomb.exploded {
            return Ok(ActionOutcome::Rejected(Rejection::BombExploded));
        }
        let outcome = match action {
            BombAction::Plant => self.plant(ctx, index, &bomb),
            BombAction::Disarm => self.disarm(ctx, index, &bomb, rules),
            BombAction::Rearm => self.rearm(ctx, index, &bomb),
        };
        Ok(outcome)
    }

    fn plant(&mut self, ctx: &mut ScenarioCtx<'_>, index: usize, bomb: &Bomb) -> ActionOutcome {
        if bomb.planted {
            return ActionOutcome::Rejected(Rejection::BombAlreadyPlanted);
        }
        self.update(ctx.grid, index, |bomb| {
            bomb.planted = true;
            bomb.armed = true;
            bomb.counter = 1;
        });
        ctx.log.push(BattleEvent::BombPlanted { index, counter: 1 });
        ActionOutcome::Planted { counter: 1 }
    }

    fn disarm(
        &mut self,
        ctx: &mut ScenarioCtx<'_>,
        index: usize,
        bomb: &Bomb,
        rules: &BombRules,
    ) -> ActionOutcome {
        if !bomb.planted {
            return ActionOutcome::Rejected(Rejection::BombNotPlanted);
        }
        if !bomb.armed {
            return ActionOutcome::Rejected(Rejection::BombNotArmed);
        }

        let check = ctx.rng.roll_d6();
        let tiebreak = ctx.rng.roll_d6();
        let result = disarm_with_rolls(check, tiebreak, rules.disarm_target);
        match result {
            DisarmResult::Disarmed => {
                self.update(ctx.grid, index, |bomb| bomb.armed = false);
                ctx.log.push(BattleEvent::BombDisarmed { index });
            }
            DisarmResult::Failed { roll } => {
                ctx.log.push(BattleEvent::DisarmFailed { index, roll });
            }
            DisarmResult::CriticalFailure { roll } => {
                ctx.log.push(BattleEvent::DisarmFailed { index, roll });
                ctx.log.push(BattleEvent::CriticalFailure { index });
                self.detonate(ctx, index, rules);
            }
        }
        ActionOutcome::Disarm(result)
    }

    fn rearm(&mut self, ctx: &mut ScenarioCtx<'_>, index: usize, bomb: &Bomb) -> ActionOutcome {
        if !bomb.planted {
            return ActionOutcome::Rejected(Rejection::BombNotPlanted);
        }
        if bomb.armed {
            return ActionOutcome::Rejected(Rejection::BombAlreadyArmed);
        }
        self.update(ctx.grid, index, |bomb| {
            bomb.armed = true;
            bomb.counter = 1;
        });
        ctx.log.push(BattleEvent::BombRearmed { index });
        ActionOutcome::Rearmed
    }

    /// Idempotent: returns `false` when the bomb had already gone off.
    pub(crate) fn detonate(
        &mut self,
        ctx: &mut ScenarioCtx<'_>,
        index: usize,
        rules: &BombRules,
    ) -> bool {
        let Some(bomb) = self.bombs.get(index) else {
            return false;
        };
        if bomb.exploded {
            return false;
        }
        let center = bomb.pos();
        self.update(ctx.grid, index, |bomb| bomb.exploded = true);
        ctx.log.push(BattleEvent::BombDetonated { index });

        for pos in ctx.grid.disc(center, rules.blast_radius) {
            if ctx.grid.get(pos).is_some_and(Cell::is_unit) {
                ctx.log.push(BattleEvent::UnitCaughtInBlast { pos });
            }
        }
        true
    }

    pub(super) fn end_phase(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &BombRules) {
        for index in 0..self.bombs.len() {
            let bomb = self.bombs[index].clone();
            if !bomb.is_live() {
                continue;
            }
            let roll = ctx.rng.roll_d6();
            ctx.log.push(BattleEvent::BombTimerRolled {
                index,
                roll,
                counter: bomb.counter,
                total: roll + bomb.counter as i32,
            });
            match tick_with_roll(&bomb, roll, rules.detonation_threshold) {
                TimerTick::Detonate => {
                    self.detonate(ctx, index, rules);
                }
                TimerTick::Advance { counter } => {
                    self.update(ctx.grid, index, |bomb| bomb.counter = counter);
                    ctx.log.push(BattleEvent::BombCounterIncreased { index, counter });
                }
                TimerTick::Dormant => {}
            }
        }
    }

    pub(super) fn check_victory(&self, ctx: &mut ScenarioCtx<'_>, scenario: &Scenario) -> VictoryCheck {
        let exploded = self.exploded_count();
        if !self.bombs.is_empty() && exploded == self.bombs.len() {
            return VictoryCheck::ended_with(
                Faction::Attacker,
                "ALL BOMBS DETONATED! Attacker Victory!\nReputation: +D3\nExperience distributed.",
            );
        }

        if ctx.grid.count_units(Faction::Attacker) == 0 {
            let credits = ctx.rng.range(2, 12) * 10;
            let reputation = if exploded == 0 { "D6" } else { "D3" };
            return VictoryCheck::ended_with(
                Faction::Defender,
                format!(
                    "Attackers eliminated! Defender Victory!\nCredits: +{credits}\nReputation: +{reputation}"
                ),
            );
        }

        if ctx.grid.count_units(Faction::Defender) == 0 && !scenario.defender.reinforcements {
            return VictoryCheck::ended_with(Faction::Attacker, "Defenders eliminated! Attacker Victory!");
        }
        VictoryCheck::Continue
    }

    /// Mutates one bomb and re-skins its marker cell to match.
    fn update(&mut self, grid: &mut Grid, index: usize, change: impl FnOnce(&mut Bomb)) {
        if let Some(bomb) = self.bombs.get_mut(index) {
            change(bomb);
            refresh_marker(grid, index, bomb);
        }
    }

    /// Re-skins every marker from bomb state; used after a load.
    pub fn refresh_markers(&self, grid: &mut Grid) {
        for (index, bomb) in self.bombs.iter().enumerate() {
            refresh_marker(grid, index, bomb);
        }
    }
}

fn refresh_marker(grid: &mut Grid, index: usize, bomb: &Bomb) {
    let Some(cell) = grid.get_mut(bomb.pos()) else {
        return;
    };
    if cell.bomb_index != Some(index) {
        return;
    }
    let (glyph, category, description) = if bomb.exploded {
        (glyphs::BOMB_DETONATED, "terrain-hazard", "DETONATED".to_string())
    } else if bomb.armed {
        (glyphs::BOMB_ARMED, "obj-marker", format!("Bomb [ARMED] Counter: {}", bomb.counter))
    } else if bomb.planted {
        (glyphs::BOMB_DISARMED, "obj-marker", "Bomb [DISARMED]".to_string())
    } else {
        (glyphs::BOMB_SITE, "obj-marker", "Bomb Site [Not Planted]".to_string())
    };
    cell.glyph = glyph;
    cell.category = category.to_string();
    cell.description = description;
}
