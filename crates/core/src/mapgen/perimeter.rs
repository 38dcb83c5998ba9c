use std::ops::RangeInclusive;

use crate::state::{Cell, Grid};
use crate::types::Pos;

const SIDE_GAP_ROWS: RangeInclusive<usize> = 11..=14;
const END_GAP_COLUMNS: RangeInclusive<usize> = 21..=29;

/// Which edges get access-point gaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AccessGaps {
    SidesOnly,
    AllEdges,
}

/// Every border cell becomes open floor, labelled as an access point or as
/// plain perimeter.
pub(super) fn apply(grid: &mut Grid, gaps: AccessGaps) {
    let (width, height) = (grid.width(), grid.height());
    for y in 0..height {
        for x in 0..width {
            let side = x == 0 || x + 1 == width;
            let end = y == 0 || y + 1 == height;
            if !side && !end {
                continue;
            }
            let access = (side && SIDE_GAP_ROWS.contains(&y))
                || (gaps == AccessGaps::AllEdges && end && END_GAP_COLUMNS.contains(&x));
            let label = if access { "Access Point" } else { "Sector Perimeter" };
            grid.set(Pos::new(x as i32, y as i32), Cell::floor(label));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellKind;

    fn desc(grid: &Grid, x: i32, y: i32) -> String {
        grid.get(Pos::new(x, y)).map(|c| c.description.clone()).unwrap_or_default()
    }

    #[test]
    fn access_points_sit_at_fixed_offsets() {
        let mut grid = Grid::filled(50, 25, Cell::wall("Bulkhead"));
        apply(&mut grid, AccessGaps::AllEdges);

        assert_eq!(desc(&grid, 0, 11), "Access Point");
        assert_eq!(desc(&grid, 49, 14), "Access Point");
        assert_eq!(desc(&grid, 0, 10), "Sector Perimeter");
        assert_eq!(desc(&grid, 21, 0), "Access Point");
        assert_eq!(desc(&grid, 29, 24), "Access Point");
        assert_eq!(desc(&grid, 30, 24), "Sector Perimeter");
        assert_eq!(grid.kind_at(Pos::new(10, 10)), Some(CellKind::Wall));
    }

    #[test]
    fn sides_only_keeps_end_edges_closed() {
        let mut grid = Grid::filled(50, 25, Cell::wall("Bulkhead"));
        apply(&mut grid, AccessGaps::SidesOnly);
        assert_eq!(desc(&grid, 25, 0), "Sector Perimeter");
        assert_eq!(desc(&grid, 49, 12), "Access Point");
    }
}
