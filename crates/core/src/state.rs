use serde::{Deserialize, Serialize};

use crate::types::{CellKind, Faction, Pos, UnitView};

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// One grid position: terrain or occupant kind plus descriptive metadata.
///
/// Terrain flags stay set on unit cells to record what the unit is standing
/// on; see [`Cell::terrain_beneath`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(rename = "type")]
    pub kind: CellKind,
    #[serde(rename = "char")]
    pub glyph: char,
    #[serde(rename = "css")]
    pub category: String,
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction: Option<Faction>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub priority: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub prone: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub on_platform: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_bridge: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_river: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_debris: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub overgrown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bomb_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casket_index: Option<usize>,
    #[serde(skip)]
    pub visible: bool,
}

impl Cell {
    pub fn new(kind: CellKind, glyph: char, category: &str, description: &str) -> Self {
        Self {
            kind,
            glyph,
            category: category.to_string(),
            description: description.to_string(),
            faction: None,
            priority: false,
            prone: false,
            on_platform: false,
            is_bridge: false,
            is_river: false,
            is_debris: false,
            overgrown: false,
            bomb_index: None,
            casket_index: None,
            visible: false,
        }
    }

    pub fn is_unit(&self) -> bool {
        self.kind == CellKind::Unit
    }

    pub fn is_faction(&self, faction: Faction) -> bool {
        self.is_unit() && self.faction == Some(faction)
    }

    /// Open terrain that a unit may be deployed onto.
    pub fn is_valid_spawn(&self) -> bool {
        !matches!(
            self.kind,
            CellKind::Wall | CellKind::Unit | CellKind::Hazard | CellKind::Objective
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(width: usize, height: usize, cell: Cell) -> Self {
        Self { width, height, cells: vec![cell; width * height] }
    }

    /// Builds a grid from row-major rows; `None` when any row length differs
    /// from `width` or the row count differs from `height`.
    pub fn from_rows(width: usize, height: usize, rows: Vec<Vec<Cell>>) -> Option<Self> {
        if rows.len() != height || rows.iter().any(|row| row.len() != width) {
            return None;
        }
        Some(Self { width, height, cells: rows.into_iter().flatten().collect() })
    }

    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.width.max(1)).map(<[Cell]>::to_vec).collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        self.cells.get_mut(idx)
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) {
        if let Some(slot) = self.get_mut(pos) {
            *slot = cell;
        }
    }

    pub fn kind_at(&self, pos: Pos) -> Option<CellKind> {
        self.get(pos).map(|cell| cell.kind)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        self.positions().zip(self.cells.iter())
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }

    pub fn is_valid_spawn(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(Cell::is_valid_spawn)
    }

    /// Every position inside the circle of `radius` around `center`, clipped
    /// to the grid.
    pub fn disc(&self, center: Pos, radius: i32) -> Vec<Pos> {
        let mut positions = Vec::new();
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let pos = Pos { y, x };
                if self.in_bounds(pos) && pos.distance(center) <= f64::from(radius) {
                    positions.push(pos);
                }
            }
        }
        positions
    }

    pub fn unit_positions(&self, faction: Faction) -> Vec<Pos> {
        self.cells().filter(|(_, cell)| cell.is_faction(faction)).map(|(pos, _)| pos).collect()
    }

    pub fn count_units(&self, faction: Faction) -> usize {
        self.cells.iter().filter(|cell| cell.is_faction(faction)).count()
    }

    pub fn roster(&self) -> Vec<UnitView> {
        self.cells()
            .filter_map(|(pos, cell)| {
                let faction = cell.faction.filter(|_| cell.is_unit())?;
                Some(UnitView {
                    pos,
                    faction,
                    description: cell.description.clone(),
                    priority: cell.priority,
                    prone: cell.prone,
                    on_platform: cell.on_platform,
                })
            })
            .collect()
    }

    pub fn clear_visible(&mut self) {
        for cell in &mut self.cells {
            cell.visible = false;
        }
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_round_trip_preserves_layout() {
        let mut grid = Grid::filled(4, 3, Cell::floor("Metal Grating"));
        grid.set(Pos::new(3, 2), Cell::wall("Bulkhead"));
        let rebuilt = Grid::from_rows(4, 3, grid.to_rows()).expect("rows should match dimensions");
        assert_eq!(rebuilt, grid);
        assert_eq!(rebuilt.kind_at(Pos::new(3, 2)), Some(CellKind::Wall));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let rows = vec![vec![Cell::floor("a"); 3], vec![Cell::floor("b"); 2]];
        assert!(Grid::from_rows(3, 2, rows).is_none());
    }

    #[test]
    fn out_of_bounds_access_is_none_and_set_is_ignored() {
        let mut grid = Grid::filled(3, 3, Cell::floor("x"));
        assert!(grid.get(Pos::new(-1, 0)).is_none());
        assert!(grid.get(Pos::new(3, 0)).is_none());
        grid.set(Pos::new(5, 5), Cell::wall("w"));
        assert!(grid.cells().all(|(_, cell)| cell.kind == CellKind::Floor));
    }

    #[test]
    fn disc_is_circular_not_square() {
        let grid = Grid::filled(20, 20, Cell::floor("x"));
        let disc = grid.disc(Pos::new(10, 10), 3);
        assert!(disc.contains(&Pos::new(13, 10)));
        assert!(!disc.contains(&Pos::new(13, 13)));
    }
}
