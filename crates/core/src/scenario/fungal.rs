//! Fungal Horror: overgrowth spreads from a central marker each round and
//! narrows sight for anyone standing in it.

use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use super::ScenarioCtx;
use super::registry::FungalRules;
use crate::log::BattleEvent;
use crate::rng::round_half_up;
use crate::state::Grid;
use crate::types::{Faction, Pos, VictoryCheck, Winner};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungalMarker {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl FungalMarker {
    pub fn pos(&self) -> Pos {
        Pos::new(self.x, self.y)
    }

    fn paint(&self, grid: &mut Grid) {
        for pos in grid.disc(self.pos(), self.radius) {
            if let Some(cell) = grid.get_mut(pos) {
                cell.mark_overgrown();
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungalState {
    pub markers: Vec<FungalMarker>,
}

impl FungalState {
    pub(super) fn setup(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &FungalRules) {
        ctx.log.push(BattleEvent::Briefing(
            "SCENARIO: FUNGAL HORROR. Survive the spreading jungle!".to_string(),
        ));
        let center = Pos::new((ctx.grid.width() / 2) as i32, (ctx.grid.height() / 2) as i32);
        let marker = FungalMarker { x: center.x, y: center.y, radius: rules.initial_radius };
        marker.paint(ctx.grid);
        self.markers = vec![marker];
        ctx.log.push(BattleEvent::FungalHorrorEstablished {
            pos: center,
            max_markers: rules.max_markers,
        });
    }

    pub(super) fn end_phase(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &FungalRules) {
        self.grow(ctx, rules);
        expose_to_spores(ctx);
    }

    /// Each existing marker rolls once; on a success a new marker sprouts
    /// in one of eight compass directions. Growth stops at the cap.
    fn grow(&mut self, ctx: &mut ScenarioCtx<'_>, rules: &FungalRules) {
        let (max_x, max_y) = (ctx.grid.width() as i32 - 1, ctx.grid.height() as i32 - 1);
        let mut sprouted = Vec::new();
        for (index, marker) in self.markers.iter().enumerate() {
            if self.markers.len() + sprouted.len() >= rules.max_markers {
                break;
            }
            let roll = ctx.rng.roll_d6();
            ctx.log.push(BattleEvent::FungalGrowthRoll { index, roll });
            if roll < rules.spread_on {
                continue;
            }
            let direction = ctx.rng.range(1, 8);
            let angle = f64::from(direction - 1) * FRAC_PI_4;
            let pos = Pos::new(
                round_half_up(f64::from(marker.x) + angle.cos() * rules.spread_distance)
                    .clamp(0, max_x),
                round_half_up(f64::from(marker.y) + angle.sin() * rules.spread_distance)
                    .clamp(0, max_y),
            );
            ctx.log.push(BattleEvent::FungusSpread { pos });
            sprouted.push(FungalMarker { x: pos.x, y: pos.y, radius: rules.initial_radius });
        }

        let grew = !sprouted.is_empty();
        for marker in sprouted {
            marker.paint(ctx.grid);
            self.markers.push(marker);
        }
        if grew && self.markers.len() >= rules.max_markers {
            ctx.log.push(BattleEvent::FungalOverrun { markers: self.markers.len() });
        }
    }

    pub fn overrun(&self, rules: &FungalRules) -> bool {
        self.markers.len() >= rules.max_markers
    }

    pub(super) fn check_victory(&self, ctx: &mut ScenarioCtx<'_>, rules: &FungalRules) -> VictoryCheck {
        let attackers = ctx.grid.count_units(Faction::Attacker);
        let defenders = ctx.grid.count_units(Faction::Defender);

        if self.overrun(rules) {
            return match (attackers, defenders) {
                (0, 0) => VictoryCheck::ended_with(
                    Winner::Draw,
                    "The jungle claims everyone. No survivors. DRAW!",
                ),
                (_, 0) => VictoryCheck::ended_with(
                    Faction::Attacker,
                    "Fungal overrun! Attackers escaped the jungle! Attacker Victory!",
                ),
                (0, _) => VictoryCheck::ended_with(
                    Faction::Defender,
                    "Fungal overrun! Defenders escaped the jungle! Defender Victory!",
                ),
                _ => match attackers.cmp(&defenders) {
                    Ordering::Less => VictoryCheck::ended_with(
                        Faction::Defender,
                        format!(
                            "Fungal overrun! {defenders} defenders outlast {attackers} attackers. Defender Victory!"
                        ),
                    ),
                    _ => VictoryCheck::ended_with(
                        Faction::Attacker,
                        format!(
                            "Fungal overrun! {attackers} attackers outlast {defenders} defenders. Attacker Victory!"
                        ),
                    ),
                },
            };
        }

        match (attackers, defenders) {
            (0, 0) => VictoryCheck::ended_with(Winner::Draw, "Both gangs consumed by the fungus! DRAW!"),
            (0, _) => VictoryCheck::ended_with(Faction::Defender, "Attackers eliminated! Defender Victory!"),
            (_, 0) => VictoryCheck::ended_with(Faction::Attacker, "Defenders eliminated! Attacker Victory!"),
            _ => VictoryCheck::Continue,
        }
    }
}

/// Every unit standing in overgrowth rolls; a 3 or less is coated in spores.
fn expose_to_spores(ctx: &mut ScenarioCtx<'_>) {
    let exposed: Vec<Pos> = ctx
        .grid
        .cells()
        .filter(|(_, cell)| cell.is_unit() && cell.overgrown)
        .map(|(pos, _)| pos)
        .collect();
    for pos in exposed {
        let roll = ctx.rng.roll_d6();
        if roll <= 3 {
            ctx.log.push(BattleEvent::SporeExposure { pos, roll });
        }
    }
}
