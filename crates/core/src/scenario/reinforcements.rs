//! Defender reinforcements arriving at the board edges.

use super::ScenarioCtx;
use super::registry::Scenario;
use crate::log::BattleEvent;
use crate::state::Cell;
use crate::types::{Faction, Pos};

const ENTRY_ATTEMPTS: u32 = 50;
/// Reinforcements never enter closer than this to an attacker.
const SAFE_DISTANCE: f64 = 10.0;

/// Whether the defender is owed reinforcements this round.
pub(super) fn due(scenario: &Scenario, round: u32) -> bool {
    scenario.defender.reinforcements
        && scenario.rules().reinforcement_start.is_some_and(|start| round >= start)
}

/// Requests D3 reinforcements and places as many as the edges allow.
pub(super) fn arrive(ctx: &mut ScenarioCtx<'_>) -> u32 {
    let count = ctx.rng.range(1, 3) as u32;
    ctx.log.push(BattleEvent::ReinforcementsRequested { count });

    let attackers = ctx.grid.unit_positions(Faction::Attacker);
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < ENTRY_ATTEMPTS {
        attempts += 1;
        let pos = edge_entry(ctx);
        let safe = attackers.iter().all(|&attacker| pos.distance(attacker) >= SAFE_DISTANCE);
        if !safe || !ctx.grid.is_valid_spawn(pos) {
            continue;
        }
        let Some(beneath) = ctx.grid.get(pos) else {
            continue;
        };
        let unit = Cell::unit_on(Faction::Defender, "Reinforcement Unit", beneath);
        ctx.grid.set(pos, unit);
        placed += 1;
    }

    if placed > 0 {
        ctx.log.push(BattleEvent::ReinforcementsArrived { count: placed });
    } else {
        ctx.log.push(BattleEvent::ReinforcementsBlocked);
    }
    placed
}

/// A random cell one step inside a board edge.
fn edge_entry(ctx: &mut ScenarioCtx<'_>) -> Pos {
    let (width, height) = (ctx.grid.width() as i32, ctx.grid.height() as i32);
    if ctx.rng.chance(0.5) {
        let y = if ctx.rng.chance(0.5) { 1 } else { height - 2 };
        Pos::new(ctx.rng.range(1, width - 2), y)
    } else {
        let x = if ctx.rng.chance(0.5) { 1 } else { width - 2 };
        Pos::new(x, ctx.rng.range(1, height - 2))
    }
}
