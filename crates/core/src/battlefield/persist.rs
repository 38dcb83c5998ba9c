//! Save format and the save/load entry points.
//!
//! Only the RNG seed is stored; a loaded battle continues the exact random
//! sequence. Visibility is never written and is recomputed on load when
//! auspex is active.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::Battlefield;
use crate::error::PersistError;
use crate::log::BattleEvent;
use crate::scenario::{Bomb, ScenarioKey, ScenarioRuntime};
use crate::slot_store::SlotStore;
use crate::state::{Cell, Grid};
use crate::types::{BattlePhase, MapType};

pub const SAVE_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBattle {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    pub rng_seed: u32,
    pub round: u32,
    pub scenario_key: Option<ScenarioKey>,
    pub map_type: MapType,
    #[serde(default)]
    pub bombs: Vec<Bomb>,
    pub map_data: Vec<Vec<Cell>>,
    #[serde(default)]
    pub auspex_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<BattlePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_state: Option<ScenarioRuntime>,
}

impl Battlefield {
    pub fn to_saved(&self) -> SavedBattle {
        let bombs = self
            .runtime
            .as_ref()
            .and_then(ScenarioRuntime::raid)
            .map(|raid| raid.bombs.clone())
            .unwrap_or_default();
        SavedBattle {
            version: SAVE_VERSION,
            width: self.grid.width(),
            height: self.grid.height(),
            rng_seed: self.rng.seed(),
            round: self.round,
            scenario_key: self.scenario.as_ref().and_then(|scenario| scenario.key()),
            map_type: self.config.map_type,
            bombs,
            map_data: self.grid.to_rows(),
            auspex_mode: self.auspex_mode,
            phase: Some(self.phase.clone()),
            scenario_state: self.runtime.clone(),
        }
    }

    pub fn serialize(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(&self.to_saved())?)
    }

    /// Replaces the whole battle with the one in `blob`. On error the
    /// battlefield is left untouched.
    pub fn deserialize(&mut self, blob: &str) -> Result<(), PersistError> {
        let saved: SavedBattle = serde_json::from_str(blob)?;
        if saved.version != SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: saved.version,
                expected: SAVE_VERSION,
            });
        }
        let (width, height) = (saved.width, saved.height);
        let grid = Grid::from_rows(width, height, saved.map_data)
            .ok_or(PersistError::DimensionMismatch { width, height })?;
        if let Some((index, bomb)) =
            saved.bombs.iter().enumerate().find(|(_, bomb)| !grid.in_bounds(bomb.pos()))
        {
            return Err(PersistError::BombOutOfBounds { index, x: bomb.x, y: bomb.y });
        }

        let scenario = saved.scenario_key.and_then(|key| match key.definition().validate() {
            Ok(scenario) => Some(scenario),
            Err(err) => {
                warn!(target: "auspex::persist", %key, %err, "saved scenario no longer valid");
                None
            }
        });
        let runtime = match (scenario.as_ref(), saved.scenario_state) {
            (None, _) => None,
            (Some(scenario), Some(state)) if !state.fits(scenario) => {
                return Err(PersistError::ScenarioStateMismatch {
                    scenario: scenario.name.clone(),
                });
            }
            (Some(scenario), state) => {
                let mut runtime = state
                    .unwrap_or_else(|| ScenarioRuntime::for_scenario(scenario, width, height));
                if let Some(raid) = runtime.raid_mut() {
                    raid.bombs = saved.bombs;
                }
                Some(runtime)
            }
        };

        self.grid = grid;
        if let Some(raid) = runtime.as_ref().and_then(ScenarioRuntime::raid) {
            raid.refresh_markers(&mut self.grid);
        }
        self.config.width = width;
        self.config.height = height;
        self.config.map_type = saved.map_type;
        self.rng.set_seed(saved.rng_seed);
        self.round = saved.round;
        self.phase = saved.phase.unwrap_or(if scenario.is_some() {
            BattlePhase::Active
        } else {
            BattlePhase::Setup
        });
        self.scenario = scenario;
        self.runtime = runtime;
        self.auspex_mode = saved.auspex_mode;

        self.log.push(BattleEvent::GameLoaded { round: self.round });
        info!(target: "auspex::persist", round = self.round, width, height, "battle loaded");
        self.refresh_visibility();
        Ok(())
    }

    pub fn save_to(&mut self, store: &mut impl SlotStore, slot: &str) -> Result<(), PersistError> {
        let blob = self.serialize()?;
        store.put(slot, &blob)?;
        debug!(target: "auspex::persist", slot, bytes = blob.len(), "battle saved");
        self.log.push(BattleEvent::GameSaved { slot: slot.to_string() });
        Ok(())
    }

    /// Returns `false` when the slot is empty; the battle is then unchanged.
    pub fn load_from(&mut self, store: &impl SlotStore, slot: &str) -> Result<bool, PersistError> {
        let Some(blob) = store.get(slot)? else {
            debug!(target: "auspex::persist", slot, "slot empty");
            return Ok(false);
        };
        self.deserialize(&blob)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattlefieldConfig;
    use crate::slot_store::MemorySlotStore;
    use ScenarioKey::ManufactorumRaid;

    fn battle(key: ScenarioKey, seed: u32) -> Battlefield {
        let mut bf = Battlefield::new(BattlefieldConfig::default(), seed);
        bf.generate(Some(key)).expect("generate");
        bf
    }

    #[test]
    fn saved_record_uses_camel_case_fields() {
        let bf = battle(ManufactorumRaid, 3);
        let value: serde_json::Value =
            serde_json::from_str(&bf.serialize().expect("serialize")).expect("json");
        for field in ["version", "rngSeed", "scenarioKey", "mapType", "bombs", "mapData", "auspexMode"] {
            assert!(value.get(field).is_some(), "missing {field}");
        }
        assert_eq!(value["scenarioKey"], "manufactorumRaid");
        assert_eq!(value["mapType"], "zm");
        assert!(value["mapData"][0][0].get("visible").is_none());
    }

    #[test]
    fn round_trip_restores_grid_bombs_and_rng() {
        let mut original = battle(ManufactorumRaid, 11);
        original.invoke_action("plantBomb", 0).expect("plant");
        original.end_round();
        let blob = original.serialize().expect("serialize");

        let mut restored = Battlefield::new(BattlefieldConfig::default(), 999);
        restored.deserialize(&blob).expect("deserialize");

        assert_eq!(restored.grid(), original.grid());
        assert_eq!(restored.round(), original.round());
        assert_eq!(restored.phase(), original.phase());
        assert_eq!(restored.rng().seed(), original.rng().seed());
        assert_eq!(restored.runtime(), original.runtime());
        assert_eq!(restored.snapshot_hash(), original.snapshot_hash());

        original.end_round();
        restored.end_round();
        assert_eq!(restored.snapshot_hash(), original.snapshot_hash());
    }

    #[test]
    fn rejected_blobs_leave_the_battle_untouched() {
        let mut bf = battle(ScenarioKey::Bushwhack, 4);
        let before = bf.snapshot_hash();

        let mut saved = bf.to_saved();
        saved.version = 7;
        let blob = serde_json::to_string(&saved).expect("json");
        assert!(matches!(
            bf.deserialize(&blob),
            Err(PersistError::UnsupportedVersion { found: 7, expected: SAVE_VERSION })
        ));

        let mut saved = bf.to_saved();
        saved.map_data.pop();
        let blob = serde_json::to_string(&saved).expect("json");
        assert!(matches!(bf.deserialize(&blob), Err(PersistError::DimensionMismatch { .. })));

        assert!(matches!(bf.deserialize("not json"), Err(PersistError::Json(_))));
        assert_eq!(bf.snapshot_hash(), before);
    }

    #[test]
    fn scenario_state_of_another_scenario_is_refused() {
        let mut bf = battle(ManufactorumRaid, 12);
        bf.invoke_action("plantBomb", 1).expect("plant");
        let before = bf.snapshot_hash();
        let conveyer = battle(ScenarioKey::Conveyer, 12);

        let mut saved = bf.to_saved();
        saved.scenario_state = conveyer.runtime().cloned();
        let blob = serde_json::to_string(&saved).expect("json");
        assert!(matches!(
            bf.deserialize(&blob),
            Err(PersistError::ScenarioStateMismatch { .. })
        ));
        assert_eq!(bf.snapshot_hash(), before);
        assert!(bf.runtime().and_then(ScenarioRuntime::raid).is_some_and(|raid| raid.bombs[1].planted));
    }

    #[test]
    fn legacy_blob_without_supplements_still_loads() {
        let bf = battle(ManufactorumRaid, 8);
        let mut saved = bf.to_saved();
        saved.phase = None;
        saved.scenario_state = None;
        let blob = serde_json::to_string(&saved).expect("json");

        let mut restored = Battlefield::new(BattlefieldConfig::default(), 1);
        restored.deserialize(&blob).expect("deserialize");
        assert_eq!(restored.phase(), &BattlePhase::Active);
        let bombs = &restored.runtime().and_then(ScenarioRuntime::raid).expect("raid").bombs;
        assert_eq!(bombs, &saved.bombs);
    }

    #[test]
    fn slots_round_trip_and_log() {
        let mut store = MemorySlotStore::new();
        let mut bf = battle(ScenarioKey::TollBridge, 21);
        bf.save_to(&mut store, "slot1").expect("save");
        assert!(matches!(bf.log().last(), Some(BattleEvent::GameSaved { .. })));

        let mut other = Battlefield::new(BattlefieldConfig::default(), 5);
        assert!(!other.load_from(&store, "empty").expect("load"));
        assert!(other.load_from(&store, "slot1").expect("load"));
        assert_eq!(other.grid(), bf.grid());
        assert_eq!(other.log().last(), Some(&BattleEvent::GameLoaded { round: 0 }));
    }

    #[test]
    fn auspex_is_recomputed_after_load() {
        let mut bf = battle(ScenarioKey::Scrag, 6);
        bf.toggle_auspex();
        let blob = bf.serialize().expect("serialize");

        let mut restored = Battlefield::new(BattlefieldConfig::default(), 0);
        restored.deserialize(&blob).expect("deserialize");
        assert!(restored.auspex_mode());
        for unit in restored.roster() {
            assert!(restored.grid().get(unit.pos).is_some_and(|cell| cell.visible));
        }
    }
}
