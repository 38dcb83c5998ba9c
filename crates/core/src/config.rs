//! Battlefield configuration: grid size, terrain densities, sight radius and
//! round-loop policy. Loadable from TOML; every field has a default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::MapType;

pub const MIN_WIDTH: usize = 16;
pub const MIN_HEIGHT: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainDensities {
    pub wall: f64,
    pub rubble: f64,
    pub hazard: f64,
}

impl Default for TerrainDensities {
    fn default() -> Self {
        Self { wall: 0.20, rubble: 0.08, hazard: 0.03 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlefieldConfig {
    pub width: usize,
    pub height: usize,
    pub map_type: MapType,
    pub densities: TerrainDensities,
    pub sight_radius: i32,
    /// Refuse `end_round` once a victory check has resolved the battle.
    pub enforce_resolution: bool,
}

impl Default for BattlefieldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 25,
            map_type: MapType::ZoneMortalis,
            densities: TerrainDensities::default(),
            sight_radius: 12,
            enforce_resolution: false,
        }
    }
}

impl BattlefieldConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        let d = self.densities;
        for (name, value) in [("wall", d.wall), ("rubble", d.rubble), ("hazard", d.hazard)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::DensityOutOfRange { name, value });
            }
        }
        let total = d.wall + d.rubble + d.hazard;
        if total > 1.0 {
            return Err(ConfigError::DensityOverflow(total));
        }
        if self.sight_radius <= 0 {
            return Err(ConfigError::SightRadius(self.sight_radius));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = BattlefieldConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, BattlefieldConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let raw = r#"
            width = 40
            map_type = "sm"

            [densities]
            wall = 0.3
        "#;
        let config = BattlefieldConfig::from_toml_str(raw).expect("valid config");
        assert_eq!(config.width, 40);
        assert_eq!(config.height, 25);
        assert_eq!(config.map_type, MapType::SectorMechanicus);
        assert_eq!(config.densities.wall, 0.3);
        assert_eq!(config.densities.rubble, 0.08);
    }

    #[test]
    fn rejects_tiny_grids_and_overfull_densities() {
        assert!(matches!(
            BattlefieldConfig::with_size(8, 8).validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));

        let raw = "[densities]\nwall = 0.7\nrubble = 0.3\nhazard = 0.1\n";
        assert!(matches!(
            BattlefieldConfig::from_toml_str(raw),
            Err(ConfigError::DensityOverflow(_))
        ));
    }

    #[test]
    fn load_reads_toml_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("battlefield.toml");
        fs::write(&path, "height = 30\nenforce_resolution = true\n").expect("write config");

        let config = BattlefieldConfig::load(&path).expect("load config");
        assert_eq!(config.height, 30);
        assert!(config.enforce_resolution);
    }
}
