//! Cellular-automata passes. Both run in place, row-major, so cells later in
//! the scan see the already-updated state of earlier ones.

use crate::rng::SeededRng;
use crate::state::{Cell, Grid};
use crate::types::{CellKind, Pos};

/// Occupied cells in the 3×3 block centred on `(x, y)`, the centre included.
fn block_count(width: usize, x: usize, y: usize, occupied: impl Fn(usize) -> bool) -> usize {
    let mut count = 0;
    for ny in (y - 1)..=(y + 1) {
        for nx in (x - 1)..=(x + 1) {
            if occupied(ny * width + nx) {
                count += 1;
            }
        }
    }
    count
}

/// Opens isolated wall fragments: an interior wall with fewer than three
/// walls in its block becomes a corridor.
pub(super) fn smooth_corridors(grid: &mut Grid) {
    let (width, height) = (grid.width(), grid.height());
    if width < 3 || height < 3 {
        return;
    }
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let walls = block_count(width, x, y, |idx| {
                let pos = Pos::new((idx % width) as i32, (idx / width) as i32);
                grid.kind_at(pos) == Some(CellKind::Wall)
            });
            let pos = Pos::new(x as i32, y as i32);
            if grid.kind_at(pos) == Some(CellKind::Wall) && walls < 3 {
                grid.set(pos, Cell::floor("Corridor"));
            }
        }
    }
}

/// Auxiliary occupancy layer used to grow machinery clusters.
pub(super) struct Occupancy {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Occupancy {
    /// Seeds interior cells with `density`; the border stays empty.
    pub(super) fn seeded(width: usize, height: usize, density: f64, rng: &mut SeededRng) -> Self {
        let mut cells = vec![false; width * height];
        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                if rng.chance(density) {
                    cells[y * width + x] = true;
                }
            }
        }
        Self { width, height, cells }
    }

    /// One survival/birth pass: occupied survives with at least `survive`
    /// occupied in its block, empty is born with at least `birth`.
    pub(super) fn step(&mut self, survive: usize, birth: usize) {
        let width = self.width;
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                let cells = &self.cells;
                let count = block_count(width, x, y, |idx| cells[idx]);
                let idx = y * width + x;
                self.cells[idx] = if self.cells[idx] { count >= survive } else { count >= birth };
            }
        }
    }

    pub(super) fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.cells.get(y * self.width + x).copied().unwrap_or(false)
    }
}
