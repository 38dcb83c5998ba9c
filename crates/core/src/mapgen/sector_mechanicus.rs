//! Sector Mechanicus: machinery blobs grown by automata, crossed by pipelines
//! and gantry walkways.

use super::TerrainGenerator;
use super::automata::Occupancy;
use super::perimeter::{self, AccessGaps};
use crate::rng::SeededRng;
use crate::state::{Cell, Grid};
use crate::terrain::glyphs;
use crate::types::{CellKind, Pos};

const MACHINE_DENSITY: f64 = 0.35;
const SMOOTHING_PASSES: usize = 2;
const SURVIVE_AT: usize = 4;
const BIRTH_AT: usize = 5;

pub struct SectorMechanicus {
    width: usize,
    height: usize,
}

impl SectorMechanicus {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    fn place_machinery(&self, grid: &mut Grid, rng: &mut SeededRng) {
        let mut machines = Occupancy::seeded(self.width, self.height, MACHINE_DENSITY, rng);
        for _ in 0..SMOOTHING_PASSES {
            machines.step(SURVIVE_AT, BIRTH_AT);
        }

        for y in 0..self.height {
            for x in 0..self.width {
                if !machines.is_occupied(x, y) {
                    continue;
                }
                let roll = rng.next_f64();
                let cell = if roll < 0.3 {
                    Cell::new(
                        CellKind::Wall,
                        glyphs::VAT,
                        "terrain-vat",
                        "Chemical Vat (Impassable)",
                    )
                } else if roll < 0.6 {
                    Cell::wall("Heavy Machinery")
                } else {
                    Cell::rubble("Slag Heap")
                };
                grid.set(Pos::new(x as i32, y as i32), cell);
            }
        }
    }

    fn lay_pipelines(&self, grid: &mut Grid, rng: &mut SeededRng) {
        let (width, height) = (self.width as i32, self.height as i32);
        let count = rng.range(2, 4);
        for _ in 0..count {
            let row = rng.range(2, height - 3);
            let start = rng.range(0, 5);
            let len = rng.range(10, width - 5);
            for x in start..(start + len).min(width) {
                grid.set(Pos::new(x, row), pipe());
            }
        }
    }

    fn lay_walkways(&self, grid: &mut Grid, rng: &mut SeededRng) {
        let (width, height) = (self.width as i32, self.height as i32);
        let count = rng.range(2, 3);
        for _ in 0..count {
            if rng.chance(0.5) {
                let row = rng.range(5, height - 5);
                for x in 2..width - 2 {
                    grid.set(Pos::new(x, row), walkway());
                }
            } else {
                let col = rng.range(5, width - 5);
                for y in 2..height - 2 {
                    grid.set(Pos::new(col, y), walkway());
                }
            }
        }
    }
}

fn pipe() -> Cell {
    Cell::new(CellKind::Floor, glyphs::PIPE, "terrain-pipe", "Pipeline (Cover)")
}

fn walkway() -> Cell {
    Cell::new(CellKind::Floor, glyphs::WALKWAY, "terrain-walkway", "Gantry Walkway")
}

impl TerrainGenerator for SectorMechanicus {
    fn generate(&self, rng: &mut SeededRng) -> Grid {
        let mut grid = Grid::filled(self.width, self.height, Cell::floor("Industrial Grating"));
        self.place_machinery(&mut grid, rng);
        self.lay_pipelines(&mut grid, rng);
        self.lay_walkways(&mut grid, rng);
        perimeter::apply(&mut grid, AccessGaps::SidesOnly);
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seed: u32) -> Grid {
        SectorMechanicus::new(50, 25).generate(&mut SeededRng::new(seed))
    }

    #[test]
    fn every_sample_has_pipes_and_walkways() {
        for seed in [1, 17, 404, 65_535] {
            let grid = sample(seed);
            assert!(grid.cells().any(|(_, c)| c.category == "terrain-walkway"), "seed {seed}");
            assert!(grid.cells().any(|(_, c)| c.category == "terrain-pipe"), "seed {seed}");
        }
    }

    #[test]
    fn perimeter_has_no_end_edge_gaps() {
        let grid = sample(8);
        for x in 0..50 {
            let top = grid.get(Pos::new(x, 0)).map(|c| c.description.as_str());
            assert_eq!(top, Some("Sector Perimeter"));
        }
    }

    #[test]
    fn machinery_uses_the_three_decorations() {
        let grid = sample(12_345);
        let descs: Vec<&str> = grid
            .cells()
            .filter(|(_, c)| c.kind != CellKind::Floor)
            .map(|(_, c)| c.description.as_str())
            .collect();
        assert!(
            descs
                .iter()
                .all(|d| matches!(*d, "Chemical Vat (Impassable)" | "Heavy Machinery" | "Slag Heap"))
        );
    }
}
