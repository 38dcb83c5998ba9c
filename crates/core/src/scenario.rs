//! Scenario engine: immutable templates in [`registry`], per-battle mutable
//! state in [`ScenarioRuntime`].
//!
//! Hooks run in a fixed order. At generation: `setup` (terrain shaping and
//! markers), deployment, `on_deployed`. Each round: `end_phase`, the
//! reinforcement check, `check_victory`.

pub mod registry;

mod ambush;
mod bomb;
mod conveyer;
mod fungal;
mod reinforcements;
mod toll_bridge;

pub use bomb::{Bomb, BombAction, RaidState, TimerTick, disarm_with_rolls, tick_with_roll};
pub use conveyer::{ConveyerState, LootCasket, Platform};
pub use fungal::{FungalMarker, FungalState};
pub use registry::{
    AmbushKind, Behaviour, BombRules, Deployment, ForceConfig, FungalRules, PlatformRules,
    RewardText, Rewards, Scenario, ScenarioDefinition, ScenarioKey, ScenarioRules, UnitCount,
};
pub use toll_bridge::{Bridge, TollBridgeState};

use serde::{Deserialize, Serialize};

use crate::config::TerrainDensities;
use crate::log::BattleLog;
use crate::rng::SeededRng;
use crate::state::Grid;
use crate::types::{Pos, VictoryCheck};

/// Mutable view of the battlefield handed to scenario hooks.
pub(crate) struct ScenarioCtx<'a> {
    pub grid: &'a mut Grid,
    pub rng: &'a mut SeededRng,
    pub log: &'a mut BattleLog,
    pub round: u32,
    pub densities: TerrainDensities,
}

/// Scenario-local state for one battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScenarioRuntime {
    Ambush { ambush: AmbushKind },
    Raid(RaidState),
    Conveyer(ConveyerState),
    Fungal(FungalState),
    TollBridge(TollBridgeState),
}

impl ScenarioRuntime {
    /// Fresh runtime for a validated scenario. Nothing is placed on the grid
    /// until [`ScenarioRuntime::setup`].
    pub fn for_scenario(scenario: &Scenario, width: usize, height: usize) -> Self {
        let d = &scenario.definition;
        match scenario.behaviour() {
            Behaviour::Ambush(ambush) => ScenarioRuntime::Ambush { ambush },
            Behaviour::ManufactorumRaid => ScenarioRuntime::Raid(RaidState::default()),
            Behaviour::Conveyer => {
                ScenarioRuntime::Conveyer(ConveyerState::new(width, height, &platform_rules(d)))
            }
            Behaviour::FungalHorror => ScenarioRuntime::Fungal(FungalState::default()),
            Behaviour::TollBridge => ScenarioRuntime::TollBridge(TollBridgeState::new(width, height)),
        }
    }

    pub(crate) fn setup(&mut self, ctx: &mut ScenarioCtx<'_>, scenario: &Scenario) {
        let d = &scenario.definition;
        match self {
            ScenarioRuntime::Ambush { ambush } => ambush::setup(ctx, *ambush),
            ScenarioRuntime::Raid(state) => state.setup(ctx, &bomb_rules(d)),
            ScenarioRuntime::Conveyer(state) => state.setup(ctx, &platform_rules(d)),
            ScenarioRuntime::Fungal(state) => state.setup(ctx, &fungal_rules(d)),
            ScenarioRuntime::TollBridge(state) => state.setup(ctx),
        }
    }

    pub(crate) fn on_deployed(&mut self, ctx: &mut ScenarioCtx<'_>) {
        if let ScenarioRuntime::Ambush { ambush: AmbushKind::Scrag } = self {
            ambush::mark_priority_target(ctx);
        }
    }

    pub(crate) fn end_phase(&mut self, ctx: &mut ScenarioCtx<'_>, scenario: &Scenario) {
        let d = &scenario.definition;
        match self {
            ScenarioRuntime::Ambush { .. } => {}
            ScenarioRuntime::Raid(state) => state.end_phase(ctx, &bomb_rules(d)),
            ScenarioRuntime::Conveyer(state) => state.end_phase(ctx, &platform_rules(d)),
            ScenarioRuntime::Fungal(state) => state.end_phase(ctx, &fungal_rules(d)),
            ScenarioRuntime::TollBridge(state) => state.end_phase(ctx),
        }
    }

    /// Brings on defender reinforcements when the scenario grants them this
    /// round. Returns how many arrived.
    pub(crate) fn reinforce(&self, ctx: &mut ScenarioCtx<'_>, scenario: &Scenario) -> u32 {
        if reinforcements::due(scenario, ctx.round) {
            reinforcements::arrive(ctx)
        } else {
            0
        }
    }

    pub(crate) fn check_victory(
        &self,
        ctx: &mut ScenarioCtx<'_>,
        scenario: &Scenario,
    ) -> VictoryCheck {
        match self {
            ScenarioRuntime::Ambush { ambush } => ambush::check_victory(ctx, *ambush),
            ScenarioRuntime::Raid(state) => state.check_victory(ctx, scenario),
            ScenarioRuntime::Conveyer(state) => {
                state.check_victory(ctx, scenario.rules().max_rounds.unwrap_or(9))
            }
            ScenarioRuntime::Fungal(state) => {
                state.check_victory(ctx, &fungal_rules(&scenario.definition))
            }
            ScenarioRuntime::TollBridge(state) => {
                state.check_victory(ctx, scenario.rules().max_rounds)
            }
        }
    }

    /// Whether this runtime is the kind `scenario` plays with.
    pub fn fits(&self, scenario: &Scenario) -> bool {
        match (scenario.behaviour(), self) {
            (Behaviour::Ambush(kind), ScenarioRuntime::Ambush { ambush }) => kind == *ambush,
            (Behaviour::ManufactorumRaid, ScenarioRuntime::Raid(_))
            | (Behaviour::Conveyer, ScenarioRuntime::Conveyer(_))
            | (Behaviour::FungalHorror, ScenarioRuntime::Fungal(_))
            | (Behaviour::TollBridge, ScenarioRuntime::TollBridge(_)) => true,
            _ => false,
        }
    }

    /// Sight radius for a unit at `pos`, narrowed inside fungal overgrowth.
    pub fn sight_limit(&self, grid: &Grid, pos: Pos, default: i32, scenario: &Scenario) -> i32 {
        match self {
            ScenarioRuntime::Fungal(_) if grid.get(pos).is_some_and(|cell| cell.overgrown) => {
                default.min(fungal_rules(&scenario.definition).line_of_sight_limit)
            }
            _ => default,
        }
    }

    pub fn raid(&self) -> Option<&RaidState> {
        match self {
            ScenarioRuntime::Raid(state) => Some(state),
            _ => None,
        }
    }

    pub fn raid_mut(&mut self) -> Option<&mut RaidState> {
        match self {
            ScenarioRuntime::Raid(state) => Some(state),
            _ => None,
        }
    }

    pub fn conveyer(&self) -> Option<&ConveyerState> {
        match self {
            ScenarioRuntime::Conveyer(state) => Some(state),
            _ => None,
        }
    }

    pub fn fungal(&self) -> Option<&FungalState> {
        match self {
            ScenarioRuntime::Fungal(state) => Some(state),
            _ => None,
        }
    }

    pub fn toll_bridge(&self) -> Option<&TollBridgeState> {
        match self {
            ScenarioRuntime::TollBridge(state) => Some(state),
            _ => None,
        }
    }
}

fn bomb_rules(d: &ScenarioDefinition) -> BombRules {
    d.bombs.clone().unwrap_or_default()
}

fn platform_rules(d: &ScenarioDefinition) -> PlatformRules {
    d.platform.clone().unwrap_or_default()
}

fn fungal_rules(d: &ScenarioDefinition) -> FungalRules {
    d.fungal_growth.clone().unwrap_or_default()
}
