pub mod battlefield;
pub mod config;
pub mod error;
pub mod log;
pub mod mapgen;
pub mod outcome;
pub mod rng;
pub mod scenario;
pub mod slot_store;
pub mod state;
pub mod terrain;
pub mod types;
pub mod visibility;

pub use battlefield::{Battlefield, SAVE_VERSION, SHROUD, SavedBattle};
pub use config::{BattlefieldConfig, TerrainDensities};
pub use error::{BattlefieldError, ConfigError, PersistError, ScenarioError, SlotStoreError};
pub use log::{BattleEvent, BattleLog};
pub use outcome::{ActionOutcome, DisarmResult, MoveOutcome, Rejection, RoundOutcome, RoundReport};
pub use rng::SeededRng;
pub use scenario::{BombAction, Scenario, ScenarioDefinition, ScenarioKey, ScenarioRuntime};
pub use slot_store::{FileSlotStore, MemorySlotStore, SlotStore};
pub use state::{Cell, Grid};
pub use types::*;
