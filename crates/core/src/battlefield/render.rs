//! Plain-text rendering of the grid for terminals and snapshots.

use super::Battlefield;
use crate::state::Grid;
use crate::terrain::glyphs;
use crate::types::{CellKind, Pos};

const NORTH: u8 = 1;
const EAST: u8 = 2;
const SOUTH: u8 = 4;
const WEST: u8 = 8;

/// Cell hidden by the auspex shroud.
pub const SHROUD: char = ' ';

fn is_wall(grid: &Grid, pos: Pos) -> bool {
    grid.kind_at(pos) == Some(CellKind::Wall)
}

/// Box-drawing glyph joining a wall to its orthogonal wall neighbours.
fn wall_glyph(grid: &Grid, pos: Pos) -> char {
    let mut mask = 0;
    for (dx, dy, bit) in [(0, -1, NORTH), (1, 0, EAST), (0, 1, SOUTH), (-1, 0, WEST)] {
        if is_wall(grid, Pos::new(pos.x + dx, pos.y + dy)) {
            mask |= bit;
        }
    }
    match mask {
        0 => '■',
        m if m == NORTH || m == SOUTH || m == NORTH | SOUTH => '│',
        m if m == EAST || m == WEST || m == EAST | WEST => '─',
        m if m == NORTH | EAST => '└',
        m if m == NORTH | WEST => '┘',
        m if m == SOUTH | EAST => '┌',
        m if m == SOUTH | WEST => '┐',
        m if m == NORTH | SOUTH | EAST => '├',
        m if m == NORTH | SOUTH | WEST => '┤',
        m if m == EAST | WEST | SOUTH => '┬',
        m if m == EAST | WEST | NORTH => '┴',
        _ => '┼',
    }
}

impl Battlefield {
    /// One line per row. Plain walls are drawn with connected box glyphs;
    /// with auspex active, unseen cells are shrouded.
    pub fn render_ascii(&self) -> String {
        let grid = &self.grid;
        let mut out = String::with_capacity((grid.width() + 1) * grid.height() * 3);
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let pos = Pos::new(x, y);
                let Some(cell) = grid.get(pos) else {
                    continue;
                };
                let glyph = if self.auspex_mode && !cell.visible {
                    SHROUD
                } else if cell.kind == CellKind::Wall && cell.glyph == glyphs::WALL {
                    wall_glyph(grid, pos)
                } else {
                    cell.glyph
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}
