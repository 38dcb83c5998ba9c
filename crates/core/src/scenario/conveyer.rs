//! The Conveyer: a circular platform that descends through the hive once its
//! stability roll plus accumulated stationary bonus reaches the threshold.

use serde::{Deserialize, Serialize};

use super::ScenarioCtx;
use super::registry::PlatformRules;
use crate::log::BattleEvent;
use crate::mapgen::regenerate_level;
use crate::rng::{SeededRng, round_half_up};
use crate::state::{Cell, Grid};
use crate::types::{CellKind, Faction, Pos, VictoryCheck};

const CASKET_ATTEMPTS: u32 = 100;
const DEPLOY_ATTEMPTS: u32 = 200;
const REDEPLOY_ATTEMPTS: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
    pub stationary_turns: u32,
    pub has_moved: bool,
}

impl Platform {
    pub fn center(&self) -> Pos {
        Pos::new(self.center_x, self.center_y)
    }

    /// Grid position at `distance` from the centre along `angle`.
    fn project(&self, angle: f64, distance: f64) -> Pos {
        Pos::new(
            round_half_up(f64::from(self.center_x) + angle.cos() * distance),
            round_half_up(f64::from(self.center_y) + angle.sin() * distance),
        )
    }

    /// Draws an angle, then a distance of `base + U[0,1) * spread`.
    fn random_point(&self, rng: &mut SeededRng, base: f64, spread: f64) -> Pos {
        let angle = rng.angle();
        let distance = base + rng.next_f64() * spread;
        self.project(angle, distance)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootCasket {
    pub x: i32,
    pub y: i32,
    pub on_platform: bool,
    pub recovered: bool,
}

impl LootCasket {
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConveyerState {
    pub platform: Platform,
    pub caskets: Vec<LootCasket>,
}

fn open_ground_at(grid: &Grid, pos: Pos) -> Option<&Cell> {
    grid.get(pos).filter(|cell| cell.kind.is_open_ground())
}

impl ConveyerState {
    pub fn new(width: usize, height: usize, rules: &PlatformRules) -> Self {
        Self {
            platform: Platform {
                center_x: (width / 2) as i32,
                center_y: (height / 2) as i32,
                radius: rules.radius,
                stationary_turns: 0,
                has_moved: false,
            },
            caskets: Vec::new(),
        }
    }

    pub fn secured_caskets(&self) -> usize {
        self.caskets.iter().filter(|casket| casket.on_platform).count()
    }

    pub(super) fn setup(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &PlatformRules) {
        ctx.log.push(BattleEvent::Briefing(
            "SCENARIO: THE CONVEYER. Descending through the underhive!".to_string(),
        ));
        for pos in ctx.grid.disc(self.platform.center(), self.platform.radius) {
            if let Some(cell) = ctx.grid.get_mut(pos)
                && cell.kind.is_open_ground()
            {
                cell.mark_platform();
            }
        }
        self.caskets.clear();
        let placed = self.place_caskets(ctx, rules.loot_casket_count);
        ctx.log.push(BattleEvent::PlatformEstablished { caskets: placed });
    }

    /// Scatters caskets 3 to 12 cells beyond the platform edge, off the
    /// border and off the platform itself.
    fn place_caskets(&mut self, ctx: &mut ScenarioCtx<'_>, count: usize) -> usize {
        let (width, height) = (ctx.grid.width() as i32, ctx.grid.height() as i32);
        let base = f64::from(self.platform.radius + 3);
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < CASKET_ATTEMPTS {
            attempts += 1;
            let pos = self.platform.random_point(ctx.rng, base, 9.0);
            if pos.x < 1 || pos.x >= width - 1 || pos.y < 1 || pos.y >= height - 1 {
                continue;
            }
            if open_ground_at(ctx.grid, pos).is_some_and(|cell| !cell.on_platform) {
                ctx.grid.set(pos, Cell::loot_casket(self.caskets.len()));
                self.caskets.push(LootCasket {
                    x: pos.x,
                    y: pos.y,
                    on_platform: false,
                    recovered: false,
                });
                placed += 1;
            }
        }
        placed
    }

    /// Defenders on the platform, attackers in a ring 16 to 21 cells beyond
    /// its edge.
    pub(crate) fn deploy(&self, ctx: &mut ScenarioCtx<'_>, attackers: u32, defenders: u32) {
        let radius = f64::from(self.platform.radius);

        let mut placed = 0;
        let mut attempts = 0;
        while placed < defenders && attempts < DEPLOY_ATTEMPTS {
            attempts += 1;
            let pos = self.platform.random_point(ctx.rng, 0.0, radius);
            let Some(cell) = open_ground_at(ctx.grid, pos).filter(|cell| cell.on_platform) else {
                continue;
            };
            let unit = Cell::unit_on(Faction::Defender, "Garrison (Defender)", cell);
            ctx.grid.set(pos, unit);
            placed += 1;
        }
        ctx.log.push(BattleEvent::Deployed { faction: Faction::Defender, placed });

        let mut placed = 0;
        let mut attempts = 0;
        while placed < attackers && attempts < DEPLOY_ATTEMPTS {
            attempts += 1;
            let pos = self.platform.random_point(ctx.rng, radius + 16.0, 5.0);
            let Some(cell) = open_ground_at(ctx.grid, pos).filter(|cell| !cell.on_platform) else {
                continue;
            };
            let unit = Cell::unit_on(Faction::Attacker, "Marauder (Attacker)", cell);
            ctx.grid.set(pos, unit);
            placed += 1;
        }
        ctx.log.push(BattleEvent::Deployed { faction: Faction::Attacker, placed });
    }

    pub(super) fn end_phase(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &PlatformRules) {
        let roll = ctx.rng.roll_d6();
        let bonus = self.platform.stationary_turns;
        let total = roll + bonus as i32;
        ctx.log.push(BattleEvent::PlatformRolled { roll, bonus, total });

        if total >= rules.move_threshold {
            self.descend(ctx, rules);
        } else {
            self.platform.stationary_turns += 1;
            let needed = rules.move_threshold - self.platform.stationary_turns as i32;
            ctx.log.push(BattleEvent::PlatformHolds { needed });
        }

        let secured = self.secured_caskets();
        if secured > 0 {
            ctx.log.push(BattleEvent::LootStatus { secured, total: rules.loot_casket_count });
        }
    }

    fn descend(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &PlatformRules) {
        ctx.log.push(BattleEvent::PlatformDescending);

        for (index, casket) in self.caskets.iter_mut().enumerate() {
            let aboard = ctx.grid.get(casket.pos()).is_some_and(|cell| cell.on_platform);
            if aboard && !casket.on_platform {
                casket.on_platform = true;
                ctx.log.push(BattleEvent::CasketSecured { index });
            }
        }

        let left_behind = |faction| {
            ctx.grid
                .cells()
                .filter(|(_, cell)| cell.is_faction(faction) && !cell.on_platform)
                .count()
        };
        let (attackers, defenders) = (left_behind(Faction::Attacker), left_behind(Faction::Defender));
        if attackers + defenders > 0 {
            ctx.log.push(BattleEvent::UnitsLeftBehind { attackers, defenders });
        }
        let displaced: Vec<Cell> = ctx
            .grid
            .cells()
            .filter(|(_, cell)| cell.is_faction(Faction::Attacker) && !cell.on_platform)
            .map(|(_, cell)| cell.clone())
            .collect();

        *ctx.grid = regenerate_level(ctx.grid, ctx.densities, ctx.rng);

        self.caskets.retain(|casket| casket.on_platform);
        for (index, casket) in self.caskets.iter().enumerate() {
            if let Some(cell) = ctx.grid.get_mut(casket.pos())
                && cell.kind == CellKind::Loot
            {
                cell.casket_index = Some(index);
            }
        }
        let placed = self.place_caskets(ctx, rules.loot_casket_count);
        ctx.log.push(BattleEvent::LevelRegenerated { caskets: placed });

        self.platform.stationary_turns = 0;
        self.platform.has_moved = true;
        self.redeploy(ctx, &displaced);
    }

    /// Returns displaced attackers to a ring 2 to 12 cells beyond the edge.
    fn redeploy(&self, ctx: &mut ScenarioCtx<'_>, displaced: &[Cell]) {
        let base = f64::from(self.platform.radius + 2);
        let mut placed = 0;
        for attacker in displaced {
            for _ in 0..REDEPLOY_ATTEMPTS {
                let pos = self.platform.random_point(ctx.rng, base, 10.0);
                let Some(cell) = open_ground_at(ctx.grid, pos).filter(|cell| !cell.on_platform)
                else {
                    continue;
                };
                let mut unit = Cell::unit_on(Faction::Attacker, &attacker.description, cell);
                unit.prone = attacker.prone;
                ctx.grid.set(pos, unit);
                placed += 1;
                break;
            }
        }
        ctx.log.push(BattleEvent::AttackersRedeployed { count: placed });
    }

    pub(super) fn check_victory(&self, ctx: &mut ScenarioCtx<'_>, max_rounds: u32) -> VictoryCheck {
        if ctx.round >= max_rounds {
            let secured = self.secured_caskets();
            let credits = secured as i32 * ctx.rng.range(1, 6) * 10;
            return VictoryCheck::ended_with(
                Faction::Defender,
                format!(
                    "{max_rounds} rounds complete! Defender Victory!\nLoot caskets secured: {secured}\nCredits: +{credits}\nReputation: +D3"
                ),
            );
        }
        if ctx.grid.count_units(Faction::Defender) == 0 {
            return VictoryCheck::ended_with(
                Faction::Attacker,
                "All defenders eliminated! Attacker Victory!\nReputation: +D3",
            );
        }
        VictoryCheck::Continue
    }
}
