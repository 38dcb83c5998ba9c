//! Scenario actions. Only the Manufactorum Raid exposes any: planting,
//! disarming and rearming bombs.

use tracing::debug;

use super::{Battlefield, scenario_ctx};
use crate::error::BattlefieldError;
use crate::log::BattleEvent;
use crate::outcome::{ActionOutcome, Rejection};
use crate::scenario::{BombAction, ScenarioRuntime};
use crate::types::{Faction, Pos};

/// Furthest an actor may stand from a bomb site, diagonals included.
const INTERACT_RANGE: f64 = 1.5;

impl Battlefield {
    /// Invokes a named scenario action (`plantBomb`, `disarmBomb`,
    /// `rearmBomb`) on bomb `bomb_index`.
    pub fn invoke_action(
        &mut self,
        action: &str,
        bomb_index: usize,
    ) -> Result<ActionOutcome, BattlefieldError> {
        let scenario = self.scenario.as_ref().ok_or(BattlefieldError::NoScenario)?;
        let unknown = || BattlefieldError::UnknownAction {
            scenario: scenario.name.clone(),
            action: action.to_string(),
        };
        let parsed = action.parse::<BombAction>().map_err(|_| unknown())?;
        if !matches!(self.runtime, Some(ScenarioRuntime::Raid(_))) {
            return Err(unknown());
        }
        self.apply_bomb_action(parsed, bomb_index)
    }

    /// Lets the unit at `actor` work the bomb at `site`: attackers plant or
    /// rearm, defenders disarm.
    pub fn interact_with_bomb(
        &mut self,
        actor: Pos,
        site: Pos,
    ) -> Result<ActionOutcome, BattlefieldError> {
        if self.scenario.is_none() {
            return Err(BattlefieldError::NoScenario);
        }
        let Some(faction) = self.grid.get(actor).filter(|c| c.is_unit()).and_then(|c| c.faction)
        else {
            return Ok(self.reject(Rejection::NoUnitAt(actor)));
        };
        let Some(index) = self.grid.get(site).and_then(|cell| cell.bomb_index) else {
            return Ok(self.reject(Rejection::NotABombSite(site)));
        };
        if actor.distance(site) > INTERACT_RANGE {
            return Ok(self.reject(Rejection::NotAdjacent));
        }
        let Some(raid) = self.runtime.as_ref().and_then(ScenarioRuntime::raid) else {
            return Ok(self.reject(Rejection::CannotInteract));
        };

        let bomb = raid.bomb(index)?.clone();
        if bomb.exploded {
            return Ok(self.reject(Rejection::BombExploded));
        }
        let action = match faction {
            Faction::Attacker if !bomb.planted => BombAction::Plant,
            Faction::Attacker if !bomb.armed => BombAction::Rearm,
            Faction::Defender if bomb.armed => BombAction::Disarm,
            _ => return Ok(self.reject(Rejection::CannotInteract)),
        };
        self.apply_bomb_action(action, index)
    }

    fn apply_bomb_action(
        &mut self,
        action: BombAction,
        index: usize,
    ) -> Result<ActionOutcome, BattlefieldError> {
        let (Some(scenario), Some(ScenarioRuntime::Raid(raid))) =
            (self.scenario.as_ref(), self.runtime.as_mut())
        else {
            return Err(BattlefieldError::NoScenario);
        };
        let rules = scenario.definition.bombs.clone().unwrap_or_default();
        let exploded_before = raid.exploded_count();
        let outcome = {
            let mut ctx =
                scenario_ctx(&mut self.grid, &mut self.rng, &mut self.log, self.round, &self.config);
            raid.apply(&mut ctx, action, index, &rules)?
        };
        let detonated = raid.exploded_count() > exploded_before;

        match &outcome {
            ActionOutcome::Rejected(rejection) => {
                debug!(target: "auspex::battlefield", %action, index, %rejection, "bomb action rejected");
                self.log.push(BattleEvent::Rejected(rejection.clone()));
            }
            _ => self.refresh_visibility(),
        }
        if detonated {
            self.evaluate_victory();
        }
        Ok(outcome)
    }

    fn reject(&mut self, rejection: Rejection) -> ActionOutcome {
        debug!(target: "auspex::battlefield", %rejection, "interaction rejected");
        self.log.push(BattleEvent::Rejected(rejection.clone()));
        ActionOutcome::Rejected(rejection)
    }
}
