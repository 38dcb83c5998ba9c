//! Force deployment: attackers along the southern edge, defenders in the
//! northern half, or the scenario's own arrangement where it has one.

use crate::log::BattleEvent;
use crate::rng::SeededRng;
use crate::scenario::{Scenario, ScenarioCtx, ScenarioRuntime, UnitCount};
use crate::state::Cell;
use crate::types::{Faction, Pos};

const DEPLOY_ATTEMPTS: u32 = 100;
/// What the simulator fields for a player-built force.
const CUSTOM_FORCE: u32 = 6;

pub(super) fn deploy_forces(ctx: &mut ScenarioCtx<'_>, scenario: &Scenario, runtime: &ScenarioRuntime) {
    match runtime {
        ScenarioRuntime::Conveyer(state) => {
            let attackers = attacker_count(scenario.attacker.count, ctx.rng);
            let defenders = defender_count(scenario.defender.count, ctx.rng);
            state.deploy(ctx, attackers, defenders);
        }
        _ => standard(ctx, scenario),
    }
}

fn attacker_count(count: UnitCount, rng: &mut SeededRng) -> u32 {
    match count {
        UnitCount::Fixed(n) => n,
        UnitCount::Custom => CUSTOM_FORCE,
        UnitCount::D3Plus(n) => rng.roll_d3() as u32 + n,
    }
}

fn defender_count(count: UnitCount, rng: &mut SeededRng) -> u32 {
    match count {
        UnitCount::Fixed(n) => n,
        UnitCount::Custom => rng.range(1, 3) as u32 + 2,
        UnitCount::D3Plus(n) => rng.range(1, 3) as u32 + n,
    }
}

fn standard(ctx: &mut ScenarioCtx<'_>, scenario: &Scenario) {
    let (width, height) = (ctx.grid.width() as i32, ctx.grid.height() as i32);

    let attackers = attacker_count(scenario.attacker.count, ctx.rng);
    let placed = scatter(ctx, attackers, Faction::Attacker, "Marauder (Attacker)", |rng| {
        Pos::new(rng.range(2, width - 3), rng.range(height - 6, height - 2))
    });
    ctx.log.push(BattleEvent::Deployed { faction: Faction::Attacker, placed });

    // The strength roll is drawn even for fixed-size garrisons.
    let roll = ctx.rng.range(1, 3) as u32;
    let defenders = match scenario.defender.count {
        UnitCount::Fixed(n) => n,
        UnitCount::Custom => roll + 2,
        UnitCount::D3Plus(n) => roll + n,
    };
    ctx.log.push(BattleEvent::DefenderStrength { count: defenders });
    let placed = scatter(ctx, defenders, Faction::Defender, "Garrison Sentry (Defender)", |rng| {
        Pos::new(rng.range(2, width - 3), rng.range(2, height / 2))
    });
    ctx.log.push(BattleEvent::Deployed { faction: Faction::Defender, placed });
}

/// Drops up to `count` units on valid spawn cells drawn from `sample`.
fn scatter(
    ctx: &mut ScenarioCtx<'_>,
    count: u32,
    faction: Faction,
    description: &str,
    mut sample: impl FnMut(&mut SeededRng) -> Pos,
) -> u32 {
    let mut placed = 0;
    let mut attempts = 0;
    while placed < count && attempts < DEPLOY_ATTEMPTS {
        attempts += 1;
        let pos = sample(&mut *ctx.rng);
        let Some(beneath) = ctx.grid.get(pos).filter(|cell| cell.is_valid_spawn()) else {
            continue;
        };
        let unit = Cell::unit_on(faction, description, beneath);
        ctx.grid.set(pos, unit);
        placed += 1;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerrainDensities;
    use crate::log::BattleLog;
    use crate::scenario::ScenarioKey;
    use crate::state::Grid;

    fn deploy_on_open_ground(key: ScenarioKey, seed: u32) -> (Grid, BattleLog) {
        let scenario = key.definition().validate().expect("valid");
        let runtime = ScenarioRuntime::for_scenario(&scenario, 50, 25);
        let mut grid = Grid::filled(50, 25, Cell::open_ground());
        let mut rng = SeededRng::new(seed);
        let mut log = BattleLog::default();
        let mut ctx = ScenarioCtx {
            grid: &mut grid,
            rng: &mut rng,
            log: &mut log,
            round: 0,
            densities: TerrainDensities::default(),
        };
        deploy_forces(&mut ctx, &scenario, &runtime);
        (grid, log)
    }

    #[test]
    fn ambush_fields_six_attackers_against_d3_plus_two() {
        let (grid, log) = deploy_on_open_ground(ScenarioKey::Bushwhack, 12);
        assert_eq!(grid.count_units(Faction::Attacker), 6);
        let defenders = grid.count_units(Faction::Defender);
        assert!((3..=5).contains(&defenders));
        assert!(log.events().contains(&BattleEvent::DefenderStrength { count: defenders as u32 }));
    }

    #[test]
    fn standard_deployment_keeps_sides_apart() {
        let (grid, _) = deploy_on_open_ground(ScenarioKey::ManufactorumRaid, 4);
        for pos in grid.unit_positions(Faction::Attacker) {
            assert!((19..=23).contains(&pos.y), "attacker at {pos}");
        }
        for pos in grid.unit_positions(Faction::Defender) {
            assert!((2..=12).contains(&pos.y), "defender at {pos}");
        }
        assert_eq!(grid.count_units(Faction::Attacker), 6);
        assert!((6..=8).contains(&grid.count_units(Faction::Defender)));
    }
}
