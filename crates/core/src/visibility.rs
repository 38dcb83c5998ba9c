//! Bresenham raycast line of sight.
//!
//! Rays are cast from the origin to every cell on the perimeter of the
//! `2r+1` bounding square (clipped to the grid). A ray marks cells until it
//! leaves the sight circle or marks an opaque cell.

use std::collections::BTreeSet;

use crate::state::Grid;
use crate::types::Pos;

/// Every cell touched by the Bresenham line from `from` to `to`, both ends
/// included. A zero-length line yields just `from`.
pub fn line(from: Pos, to: Pos) -> Vec<Pos> {
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;
    let mut cur = from;
    let mut points = Vec::with_capacity((dx.max(dy) + 1) as usize);

    loop {
        points.push(cur);
        if cur == to {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            cur.x += sx;
        }
        if e2 < dx {
            err += dx;
            cur.y += sy;
        }
    }
    points
}

pub fn calculate_visibility(grid: &Grid, origin: Pos, radius: i32) -> BTreeSet<Pos> {
    let mut visible = BTreeSet::new();
    visible.insert(origin);
    if grid.width() == 0 || grid.height() == 0 {
        return visible;
    }

    let max_x = grid.width() as i32 - 1;
    let max_y = grid.height() as i32 - 1;
    let min_x = (origin.x - radius).max(0);
    let hi_x = (origin.x + radius).min(max_x);
    let min_y = (origin.y - radius).max(0);
    let hi_y = (origin.y + radius).min(max_y);

    for x in min_x..=hi_x {
        cast_ray(grid, origin, Pos::new(x, min_y), radius, &mut visible);
        cast_ray(grid, origin, Pos::new(x, hi_y), radius, &mut visible);
    }
    for y in min_y..=hi_y {
        cast_ray(grid, origin, Pos::new(min_x, y), radius, &mut visible);
        cast_ray(grid, origin, Pos::new(hi_x, y), radius, &mut visible);
    }
    visible
}

fn cast_ray(grid: &Grid, origin: Pos, target: Pos, radius: i32, visible: &mut BTreeSet<Pos>) {
    for point in line(origin, target) {
        if point.distance(origin) > f64::from(radius) {
            break;
        }
        visible.insert(point);
        if point == origin {
            continue;
        }
        if grid.kind_at(point).is_some_and(|kind| kind.is_opaque()) {
            break;
        }
    }
}

/// Recomputes the transient `visible` flags as the union of what every unit
/// on the board can see. `sight_for` supplies the per-unit radius.
pub fn apply_global_auspex(grid: &mut Grid, sight_for: impl Fn(&Grid, Pos) -> i32) {
    grid.clear_visible();
    let observers: Vec<Pos> =
        grid.cells().filter(|(_, cell)| cell.is_unit()).map(|(pos, _)| pos).collect();

    let mut seen = BTreeSet::new();
    for origin in observers {
        let radius = sight_for(grid, origin);
        seen.extend(calculate_visibility(grid, origin, radius));
    }
    for pos in seen {
        if let Some(cell) = grid.get_mut(pos) {
            cell.visible = true;
        }
    }
}
