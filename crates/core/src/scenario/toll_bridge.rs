//! Toll Bridge: a toxic river splits the board and the only crossing pivots
//! a quarter turn on a bad roll, taking its passengers with it.

use serde::{Deserialize, Serialize};

use super::ScenarioCtx;
use crate::log::BattleEvent;
use crate::state::{Cell, Grid};
use crate::types::{CellKind, Faction, Orientation, PivotDirection, Pos, VictoryCheck, Winner};

const DEBRIS_PIECES: usize = 8;
const DEBRIS_ATTEMPTS: u32 = 100;
const PIVOT_FROM_ROUND: u32 = 3;
const CONTROL_RADIUS: f64 = 6.0;
/// Half the bridge's long side; the short side spans one cell either way.
const HALF_SPAN: i32 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    pub orientation: Orientation,
    pub cells: Vec<Pos>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TollBridgeState {
    pub river_start: i32,
    pub river_end: i32,
    pub center: Pos,
    pub bridge: Bridge,
}

impl TollBridgeState {
    pub fn new(width: usize, height: usize) -> Self {
        let (cx, cy) = ((width / 2) as i32, (height / 2) as i32);
        Self {
            river_start: cx - 3,
            river_end: cx + 3,
            center: Pos::new(cx, cy),
            bridge: Bridge { orientation: Orientation::Horizontal, cells: Vec::new() },
        }
    }

    pub fn in_river_band(&self, x: i32) -> bool {
        (self.river_start..=self.river_end).contains(&x)
    }

    /// The bridge footprint for `orientation`, clipped to the grid.
    fn span(&self, grid: &Grid, orientation: Orientation) -> Vec<Pos> {
        let (half_w, half_h) = match orientation {
            Orientation::Horizontal => (HALF_SPAN, 1),
            Orientation::Vertical => (1, HALF_SPAN),
        };
        let mut cells = Vec::new();
        for y in (self.center.y - half_h)..=(self.center.y + half_h) {
            for x in (self.center.x - half_w)..=(self.center.x + half_w) {
                let pos = Pos::new(x, y);
                if grid.in_bounds(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    pub(super) fn setup(&mut self, ctx: &mut ScenarioCtx<'_>) {
        ctx.log.push(BattleEvent::Briefing(
            "SCENARIO: TOLL BRIDGE. Control the crossing over the toxic river!".to_string(),
        ));
        for y in 0..ctx.grid.height() as i32 {
            for x in self.river_start..=self.river_end {
                ctx.grid.set(Pos::new(x, y), Cell::river("Toxic River (Out of Action on entry)"));
            }
        }

        self.bridge.orientation = Orientation::Horizontal;
        self.bridge.cells = self.span(ctx.grid, Orientation::Horizontal);
        for &pos in &self.bridge.cells {
            ctx.grid.set(pos, Cell::bridge(self.in_river_band(pos.x)));
        }

        let height = ctx.grid.height() as i32;
        let mut placed = 0;
        let mut attempts = 0;
        while placed < DEBRIS_PIECES && attempts < DEBRIS_ATTEMPTS {
            attempts += 1;
            let pos = Pos::new(
                ctx.rng.range(self.river_start, self.river_end),
                ctx.rng.range(0, height - 1),
            );
            let open_water = ctx.grid.get(pos).is_some_and(|cell| {
                cell.kind == CellKind::Hazard && cell.is_river && !cell.is_bridge
            });
            if open_water {
                ctx.grid.set(pos, Cell::debris());
                placed += 1;
            }
        }
        ctx.log.push(BattleEvent::RiverConstructed { debris: placed });
    }

    pub(super) fn end_phase(&mut self, ctx: &mut ScenarioCtx<'_>) {
        if ctx.round < PIVOT_FROM_ROUND {
            return;
        }
        let roll = ctx.rng.roll_d6();
        ctx.log.push(BattleEvent::BridgeRolled { roll });
        match roll {
            5 => self.pivot(ctx, PivotDirection::Clockwise),
            6 => self.pivot(ctx, PivotDirection::CounterClockwise),
            _ => ctx.log.push(BattleEvent::BridgeHolds),
        }
    }

    fn pivot(&mut self, ctx: &mut ScenarioCtx<'_>, direction: PivotDirection) {
        ctx.log.push(BattleEvent::BridgePivoting { direction });

        let riders: Vec<(Pos, Cell)> = self
            .bridge
            .cells
            .iter()
            .filter_map(|&pos| ctx.grid.get(pos).filter(|cell| cell.is_unit()).map(|c| (pos, c.clone())))
            .collect();

        for &pos in &self.bridge.cells {
            let water = if self.in_river_band(pos.x) {
                Cell::river("Toxic River")
            } else {
                Cell::floor("Ground")
            };
            ctx.grid.set(pos, water);
        }

        let orientation = self.bridge.orientation.flipped();
        let cells = self.span(ctx.grid, orientation);
        for &pos in &cells {
            let deck = Cell::bridge(self.in_river_band(pos.x));
            if ctx.grid.get(pos).is_some_and(Cell::is_unit) {
                if let Some(unit) = ctx.grid.get_mut(pos) {
                    unit.copy_standing_flags(&deck);
                }
            } else {
                ctx.grid.set(pos, deck);
            }
        }
        self.bridge = Bridge { orientation, cells };

        for (from, rider) in riders {
            self.carry(ctx, direction, from, &rider);
        }
    }

    /// Rotates one passenger about the pivot and resolves where it ends up.
    fn carry(&self, ctx: &mut ScenarioCtx<'_>, direction: PivotDirection, from: Pos, rider: &Cell) {
        let (rel_x, rel_y) = direction.rotate(from.x - self.center.x, from.y - self.center.y);
        let to = Pos::new(self.center.x + rel_x, self.center.y + rel_y);

        let Some(faction) = rider.faction else {
            return;
        };
        let Some(beneath) = ctx.grid.get(to).filter(|cell| !cell.is_unit()).cloned() else {
            ctx.log.push(BattleEvent::UnitDisplaced { at: to });
            return;
        };

        if beneath.is_bridge {
            let mut unit = Cell::unit_on(faction, &rider.description, &beneath);
            unit.priority = rider.priority;
            unit.prone = rider.prone;
            ctx.grid.set(to, unit);
            ctx.log.push(BattleEvent::UnitRotated { to });
        } else if self.in_river_band(to.x) {
            ctx.log.push(BattleEvent::UnitFellIntoRiver { at: to });
        } else {
            let description = if rider.prone {
                rider.description.clone()
            } else {
                format!("{} (Prone)", rider.description)
            };
            let mut unit = Cell::unit_on(faction, &description, &beneath);
            unit.priority = rider.priority;
            unit.prone = true;
            ctx.grid.set(to, unit);
            ctx.log.push(BattleEvent::UnitFellOnShore { at: to });
        }
    }

    pub(super) fn check_victory(&self, ctx: &mut ScenarioCtx<'_>, max_rounds: Option<u32>) -> VictoryCheck {
        let grid = &*ctx.grid;
        let attackers = grid.count_units(Faction::Attacker);
        let defenders = grid.count_units(Faction::Defender);
        if attackers == 0 && defenders == 0 {
            return VictoryCheck::ended_with(Winner::Draw, "Both gangs eliminated! DRAW!");
        }

        if ctx.round >= PIVOT_FROM_ROUND {
            let near = |faction| {
                grid.unit_positions(faction)
                    .into_iter()
                    .filter(|pos| pos.distance(self.center) <= CONTROL_RADIUS)
                    .count()
            };
            match (near(Faction::Attacker), near(Faction::Defender)) {
                (a, 0) if a > 0 => {
                    return VictoryCheck::ended_with(
                        Faction::Attacker,
                        "Attackers hold the bridge! Attacker Victory!",
                    );
                }
                (0, d) if d > 0 => {
                    return VictoryCheck::ended_with(
                        Faction::Defender,
                        "Defenders hold the bridge! Defender Victory!",
                    );
                }
                _ => {}
            }
        }

        if attackers == 0 {
            return VictoryCheck::ended_with(Faction::Defender, "Attackers eliminated! Defender Victory!");
        }
        if defenders == 0 {
            return VictoryCheck::ended_with(Faction::Attacker, "Defenders eliminated! Attacker Victory!");
        }
        if let Some(max) = max_rounds
            && ctx.round >= max
        {
            return VictoryCheck::ended_with(
                Winner::Draw,
                format!("The bridge is still contested after {max} rounds. DRAW!"),
            );
        }
        VictoryCheck::Continue
    }
}
