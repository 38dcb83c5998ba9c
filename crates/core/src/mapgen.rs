//! Procedural terrain generation split into the two sector strategies plus the
//! shared automata and perimeter passes.

mod automata;
mod perimeter;
mod sector_mechanicus;
mod zone_mortalis;

pub use sector_mechanicus::SectorMechanicus;
pub use zone_mortalis::ZoneMortalis;

use crate::config::{BattlefieldConfig, TerrainDensities};
use crate::rng::SeededRng;
use crate::state::Grid;
use crate::types::MapType;

/// A terrain strategy. Implementations draw only from the supplied stream and
/// always return a fully populated `width × height` grid.
pub trait TerrainGenerator {
    fn generate(&self, rng: &mut SeededRng) -> Grid;
}

pub fn generator_for(config: &BattlefieldConfig) -> Box<dyn TerrainGenerator> {
    match config.map_type {
        MapType::ZoneMortalis => {
            Box::new(ZoneMortalis::new(config.width, config.height, config.densities))
        }
        MapType::SectorMechanicus => Box::new(SectorMechanicus::new(config.width, config.height)),
    }
}

pub fn generate_terrain(config: &BattlefieldConfig, rng: &mut SeededRng) -> Grid {
    generator_for(config).generate(rng)
}

/// Rebuilds the whole grid with fresh noise and smoothing, then copies every
/// platform-flagged cell (and whatever stands on it) back into place.
pub fn regenerate_level(
    previous: &Grid,
    densities: TerrainDensities,
    rng: &mut SeededRng,
) -> Grid {
    let mut grid = zone_mortalis::noise_fill_full(
        previous.width(),
        previous.height(),
        densities,
        rng,
    );
    automata::smooth_corridors(&mut grid);
    for (pos, cell) in previous.cells().filter(|(_, cell)| cell.on_platform) {
        grid.set(pos, cell.clone());
    }
    grid
}
