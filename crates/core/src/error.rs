//! Error types for configuration, scenario binding, persistence and save slots.
//!
//! Expected game conditions (blocked moves, rejected bomb actions, units lost
//! in the river) are not errors; they travel as [`crate::Rejection`] values
//! and outcome enums.

use std::io;

use thiserror::Error;
use toml::de::Error as TomlError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] TomlError),

    #[error("grid {width}x{height} is below the {min_width}x{min_height} minimum")]
    GridTooSmall { width: usize, height: usize, min_width: usize, min_height: usize },

    #[error("terrain density {name}={value} must lie in [0, 1]")]
    DensityOutOfRange { name: &'static str, value: f64 },

    #[error("terrain densities sum to {0}, which exceeds 1")]
    DensityOverflow(f64),

    #[error("sight radius must be positive, got {0}")]
    SightRadius(i32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("invalid scenario: missing properties [{}]", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("unknown scenario key '{0}'")]
    UnknownKey(String),
}

/// Programmer-error class failures: the caller asked for something that
/// cannot exist in the current battle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattlefieldError {
    #[error("no scenario is bound to the battlefield")]
    NoScenario,

    #[error("bomb index {index} out of range ({count} bombs)")]
    BombIndex { index: usize, count: usize },

    #[error("scenario '{scenario}' has no action '{action}'")]
    UnknownAction { scenario: String, action: String },
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("map data does not match declared dimensions {width}x{height}")]
    DimensionMismatch { width: usize, height: usize },

    #[error("bomb {index} at {x},{y} is outside the map")]
    BombOutOfBounds { index: usize, x: i32, y: i32 },

    #[error("saved scenario state does not belong to scenario '{scenario}'")]
    ScenarioStateMismatch { scenario: String },

    #[error("save slot error: {0}")]
    Slot(#[from] SlotStoreError),
}

#[derive(Error, Debug)]
pub enum SlotStoreError {
    #[error("slot I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("slot envelope is not valid JSON: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("invalid slot name '{0}'")]
    InvalidSlotName(String),

    #[error("checksum mismatch in slot '{0}'")]
    ChecksumMismatch(String),
}
