//! The battlefield aggregate: owns the grid, the RNG handle, the round
//! counter and the bound scenario, and orchestrates generation, rounds,
//! movement, scenario actions and visibility.

mod actions;
mod deploy;
mod hash;
mod movement;
mod persist;
mod render;
mod rounds;

pub use persist::{SAVE_VERSION, SavedBattle};
pub use render::SHROUD;

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::config::BattlefieldConfig;
use crate::error::ScenarioError;
use crate::log::{BattleEvent, BattleLog};
use crate::mapgen::generate_terrain;
use crate::rng::SeededRng;
use crate::scenario::{Scenario, ScenarioCtx, ScenarioDefinition, ScenarioKey, ScenarioRuntime};
use crate::state::{Cell, Grid};
use crate::types::{BattlePhase, Pos, UnitView, VictoryCheck};
use crate::visibility::{apply_global_auspex, calculate_visibility};

pub struct Battlefield {
    config: BattlefieldConfig,
    grid: Grid,
    rng: SeededRng,
    round: u32,
    phase: BattlePhase,
    scenario: Option<Scenario>,
    runtime: Option<ScenarioRuntime>,
    log: BattleLog,
    auspex_mode: bool,
}

/// Builds a scenario hook context from disjoint battlefield fields.
fn scenario_ctx<'a>(
    grid: &'a mut Grid,
    rng: &'a mut SeededRng,
    log: &'a mut BattleLog,
    round: u32,
    config: &BattlefieldConfig,
) -> ScenarioCtx<'a> {
    ScenarioCtx { grid, rng, log, round, densities: config.densities }
}

impl Battlefield {
    pub fn new(config: BattlefieldConfig, seed: u32) -> Self {
        let grid = Grid::filled(config.width, config.height, Cell::open_ground());
        Self {
            config,
            grid,
            rng: SeededRng::new(seed),
            round: 0,
            phase: BattlePhase::Setup,
            scenario: None,
            runtime: None,
            log: BattleLog::default(),
            auspex_mode: false,
        }
    }

    pub fn config(&self) -> &BattlefieldConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rng(&self) -> &SeededRng {
        &self.rng
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> &BattlePhase {
        &self.phase
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub fn runtime(&self) -> Option<&ScenarioRuntime> {
        self.runtime.as_ref()
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn auspex_mode(&self) -> bool {
        self.auspex_mode
    }

    /// Generates a fresh battle. With no key an ambush is drawn at random
    /// before any terrain is laid.
    pub fn generate(&mut self, key: Option<ScenarioKey>) -> Result<(), ScenarioError> {
        let key = match key {
            Some(key) => key,
            None => self.rng.pick(&ScenarioKey::AMBUSHES).copied().unwrap_or(ScenarioKey::Bushwhack),
        };
        self.generate_with_definition(key.definition())
    }

    /// Generates a battle from an arbitrary definition. An invalid definition
    /// aborts generation and leaves no scenario bound.
    pub fn generate_with_definition(
        &mut self,
        definition: ScenarioDefinition,
    ) -> Result<(), ScenarioError> {
        self.reset();
        let scenario = match definition.validate() {
            Ok(scenario) => scenario,
            Err(err) => {
                warn!(target: "auspex::battlefield", %err, "scenario rejected");
                self.log.push(BattleEvent::ScenarioRejected { reason: err.to_string() });
                return Err(err);
            }
        };
        self.log.push(BattleEvent::ScenarioLoaded {
            name: scenario.name.clone(),
            description: scenario.definition.description.clone(),
        });

        self.grid = generate_terrain(&self.config, &mut self.rng);
        let mut runtime =
            ScenarioRuntime::for_scenario(&scenario, self.grid.width(), self.grid.height());
        {
            let mut ctx =
                scenario_ctx(&mut self.grid, &mut self.rng, &mut self.log, self.round, &self.config);
            runtime.setup(&mut ctx, &scenario);
            deploy::deploy_forces(&mut ctx, &scenario, &runtime);
            runtime.on_deployed(&mut ctx);
        }

        info!(
            target: "auspex::battlefield",
            scenario = %scenario.name,
            map = self.config.map_type.code(),
            seed = self.rng.seed(),
            "battlefield generated"
        );
        self.scenario = Some(scenario);
        self.runtime = Some(runtime);
        self.phase = BattlePhase::Active;
        self.refresh_visibility();
        Ok(())
    }

    fn reset(&mut self) {
        self.grid = Grid::filled(self.config.width, self.config.height, Cell::open_ground());
        self.round = 0;
        self.phase = BattlePhase::Setup;
        self.scenario = None;
        self.runtime = None;
        self.log.clear();
    }

    /// Runs the bound scenario's victory check and moves to `Resolved` when
    /// the battle has ended.
    fn evaluate_victory(&mut self) -> VictoryCheck {
        let (Some(scenario), Some(runtime)) = (self.scenario.as_ref(), self.runtime.as_ref()) else {
            return VictoryCheck::Continue;
        };
        let check = {
            let mut ctx =
                scenario_ctx(&mut self.grid, &mut self.rng, &mut self.log, self.round, &self.config);
            runtime.check_victory(&mut ctx, scenario)
        };
        if let VictoryCheck::Ended { winner, message } = &check {
            info!(target: "auspex::battlefield", ?winner, round = self.round, "battle resolved");
            self.log.push(BattleEvent::BattleResolved { winner: *winner, message: message.clone() });
            self.phase = BattlePhase::Resolved { winner: *winner, message: message.clone() };
        }
        check
    }

    /// Recomputes the transient `visible` flags from every unit on the board.
    /// Returns how many cells are visible.
    pub fn compute_visibility(&mut self) -> usize {
        let radius = self.config.sight_radius;
        let (runtime, scenario) = (&self.runtime, &self.scenario);
        apply_global_auspex(&mut self.grid, |grid, pos| match (runtime, scenario) {
            (Some(runtime), Some(scenario)) => runtime.sight_limit(grid, pos, radius, scenario),
            _ => radius,
        });
        self.grid.cells().filter(|(_, cell)| cell.visible).count()
    }

    /// Recomputes visibility after the roster or terrain changed, when
    /// auspex is active.
    fn refresh_visibility(&mut self) {
        if self.auspex_mode {
            self.compute_visibility();
        }
    }

    /// Cells a single unit at `pos` can see, honouring scenario sight limits.
    pub fn unit_visibility(&self, pos: Pos) -> BTreeSet<Pos> {
        let radius = match (&self.runtime, &self.scenario) {
            (Some(runtime), Some(scenario)) => {
                runtime.sight_limit(&self.grid, pos, self.config.sight_radius, scenario)
            }
            _ => self.config.sight_radius,
        };
        calculate_visibility(&self.grid, pos, radius)
    }

    /// Flips global auspex. Terrain is never touched; only the transient
    /// visibility flags change.
    pub fn toggle_auspex(&mut self) -> bool {
        self.auspex_mode = !self.auspex_mode;
        if self.auspex_mode {
            self.compute_visibility();
        } else {
            self.grid.clear_visible();
        }
        self.log.push(BattleEvent::AuspexToggled { active: self.auspex_mode });
        self.auspex_mode
    }

    pub fn roster(&self) -> Vec<UnitView> {
        self.grid.roster()
    }

    /// The line a status bar would show: the verdict once resolved, otherwise
    /// the latest log entry.
    pub fn status_message(&self) -> String {
        match &self.phase {
            BattlePhase::Resolved { message, .. } => message.clone(),
            _ => self
                .log
                .last()
                .map(ToString::to_string)
                .unwrap_or_else(|| "Awaiting orders.".to_string()),
        }
    }
}
