//! Zone Mortalis: dense hive corridors from banded noise and one smoothing
//! pass.

use super::TerrainGenerator;
use super::automata::smooth_corridors;
use super::perimeter::{self, AccessGaps};
use crate::config::TerrainDensities;
use crate::rng::SeededRng;
use crate::state::{Cell, Grid};
use crate::types::Pos;

pub struct ZoneMortalis {
    width: usize,
    height: usize,
    densities: TerrainDensities,
}

impl ZoneMortalis {
    pub fn new(width: usize, height: usize, densities: TerrainDensities) -> Self {
        Self { width, height, densities }
    }
}

impl TerrainGenerator for ZoneMortalis {
    fn generate(&self, rng: &mut SeededRng) -> Grid {
        let mut grid = Grid::filled(self.width, self.height, Cell::floor("Metal Grating"));
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let noise = rng.next_f64();
                let column_line = x % 4 == 0 || y % 4 == 0;
                let wall_label = if column_line { "Structural Column" } else { "Bulkhead" };
                grid.set(
                    Pos::new(x as i32, y as i32),
                    banded_cell(noise, self.densities, wall_label),
                );
            }
        }
        perimeter::apply(&mut grid, AccessGaps::AllEdges);
        smooth_corridors(&mut grid);
        grid
    }
}

/// Maps one uniform float onto the cumulative wall/rubble/hazard/floor bands.
fn banded_cell(noise: f64, densities: TerrainDensities, wall_label: &str) -> Cell {
    let wall = densities.wall;
    let rubble = wall + densities.rubble;
    let hazard = rubble + densities.hazard;
    if noise < wall {
        Cell::wall(wall_label)
    } else if noise < rubble {
        Cell::rubble("Industrial Detritus")
    } else if noise < hazard {
        Cell::hazard("Sump Spill")
    } else {
        Cell::floor("Metal Grating")
    }
}

/// Noise over every cell, border included, with no perimeter pass. Used when
/// a new level is built beneath a descending platform.
pub(super) fn noise_fill_full(
    width: usize,
    height: usize,
    densities: TerrainDensities,
    rng: &mut SeededRng,
) -> Grid {
    let mut grid = Grid::filled(width, height, Cell::floor("Metal Grating"));
    for y in 0..height {
        for x in 0..width {
            let noise = rng.next_f64();
            grid.set(Pos::new(x as i32, y as i32), banded_cell(noise, densities, "Bulkhead"));
        }
    }
    grid
}
