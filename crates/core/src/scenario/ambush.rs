//! The three Zone Mortalis ambushes. They share deployment and differ only in
//! briefing and in how the battle ends.

use super::ScenarioCtx;
use super::registry::AmbushKind;
use crate::log::BattleEvent;
use crate::state::Grid;
use crate::types::{Faction, VictoryCheck, Winner};

pub(super) fn setup(ctx: &mut ScenarioCtx<'_>, ambush: AmbushKind) {
    let briefing = match ambush {
        AmbushKind::Bushwhack => {
            "OBJECTIVE: BUSHWHACK. Eliminate enemy leaders and high-value targets."
        }
        AmbushKind::Scrag => "OBJECTIVE: SCRAG. Eliminate the priority target marked with [!]",
        AmbushKind::Mayhem => {
            "OBJECTIVE: MAYHEM. Inflict maximum casualties and escape via deployment edge."
        }
    };
    ctx.log.push(BattleEvent::Briefing(briefing.to_string()));
}

/// Tags one deployed defender as the priority target.
pub(super) fn mark_priority_target(ctx: &mut ScenarioCtx<'_>) {
    let defenders = ctx.grid.unit_positions(Faction::Defender);
    let Some(&target) = ctx.rng.pick(&defenders) else {
        return;
    };
    if let Some(cell) = ctx.grid.get_mut(target) {
        cell.priority = true;
        cell.description = "Priority Target [!]".to_string();
        ctx.log.push(BattleEvent::PriorityTargetMarked { pos: target });
    }
}

pub(super) fn check_victory(ctx: &mut ScenarioCtx<'_>, ambush: AmbushKind) -> VictoryCheck {
    let grid = &*ctx.grid;
    if ambush == AmbushKind::Scrag {
        let target_alive =
            grid.cells().any(|(_, cell)| cell.is_faction(Faction::Defender) && cell.priority);
        if !target_alive {
            return VictoryCheck::ended_with(Faction::Attacker, "VICTORY: Target eliminated!");
        }
    }
    eliminations(grid, ambush)
}

fn eliminations(grid: &Grid, ambush: AmbushKind) -> VictoryCheck {
    let attackers = grid.count_units(Faction::Attacker);
    let defenders = grid.count_units(Faction::Defender);
    match (attackers, defenders) {
        (0, 0) => VictoryCheck::ended_with(Winner::Draw, "Both gangs eliminated! DRAW!"),
        (0, _) => VictoryCheck::ended_with(Faction::Defender, "Attackers bottled out! Defender Victory!"),
        (_, 0) => {
            let message = match ambush {
                AmbushKind::Bushwhack => "Leaders and champions down! Attacker Victory!",
                AmbushKind::Scrag => "Defenders eliminated! Attacker Victory!",
                AmbushKind::Mayhem => "Maximum casualties inflicted! Attacker Victory!",
            };
            VictoryCheck::ended_with(Faction::Attacker, message)
        }
        _ => VictoryCheck::Continue,
    }
}
