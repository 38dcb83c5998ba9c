//! Terrain palette: the canonical cells every generator and scenario stamps.
//! Also owns the single rule for what terrain is left behind when a unit
//! vacates a cell.

use crate::state::Cell;
use crate::types::{CellKind, Faction};

pub const PLATFORM_TAG: &str = " [PLATFORM]";
pub const OVERGROWN_TAG: &str = " [OVERGROWN]";

pub mod glyphs {
    pub const FLOOR: char = '·';
    pub const WALL: char = '#';
    pub const RUBBLE: char = '▒';
    pub const HAZARD: char = '≈';
    pub const VAT: char = 'O';
    pub const PIPE: char = '=';
    pub const WALKWAY: char = '+';
    pub const BRIDGE: char = '≡';
    pub const DEBRIS: char = 'O';
    pub const FUNGAL: char = '▓';
    pub const LOOT: char = '◆';
    pub const BOMB_SITE: char = '⊗';
    pub const BOMB_ARMED: char = '◉';
    pub const BOMB_DISARMED: char = '⊘';
    pub const BOMB_DETONATED: char = '✸';
}

impl Cell {
    pub fn floor(description: &str) -> Self {
        Cell::new(CellKind::Floor, glyphs::FLOOR, "terrain-floor", description)
    }

    pub fn wall(description: &str) -> Self {
        Cell::new(CellKind::Wall, glyphs::WALL, "terrain-wall", description)
    }

    pub fn rubble(description: &str) -> Self {
        Cell::new(CellKind::Rubble, glyphs::RUBBLE, "terrain-rubble", description)
    }

    pub fn hazard(description: &str) -> Self {
        Cell::new(CellKind::Hazard, glyphs::HAZARD, "terrain-hazard", description)
    }

    pub fn open_ground() -> Self {
        Cell::floor("Open Ground")
    }

    pub fn river(description: &str) -> Self {
        let mut cell = Cell::hazard(description);
        cell.is_river = true;
        cell
    }

    pub fn bridge(over_river: bool) -> Self {
        let mut cell = Cell::new(CellKind::Floor, glyphs::BRIDGE, "terrain-floor", "Toll Bridge");
        cell.is_bridge = true;
        cell.is_river = over_river;
        cell
    }

    pub fn debris() -> Self {
        let mut cell =
            Cell::new(CellKind::Rubble, glyphs::DEBRIS, "terrain-rubble", "Flotsam (Debris)");
        cell.is_debris = true;
        cell.is_river = true;
        cell
    }

    pub fn loot_casket(casket_index: usize) -> Self {
        let mut cell = Cell::new(CellKind::Loot, glyphs::LOOT, "obj-marker", "Loot Casket");
        cell.casket_index = Some(casket_index);
        cell
    }

    pub fn bomb_site(bomb_index: usize) -> Self {
        let mut cell = Cell::new(
            CellKind::Objective,
            glyphs::BOMB_SITE,
            "obj-marker",
            "Bomb Site [Not Planted]",
        );
        cell.bomb_index = Some(bomb_index);
        cell
    }

    /// A unit standing on `beneath`; the standing flags are copied so the
    /// terrain can be restored when the unit leaves.
    pub fn unit_on(faction: Faction, description: &str, beneath: &Cell) -> Self {
        let mut cell = Cell::new(CellKind::Unit, faction.glyph(), faction.category(), description);
        cell.faction = Some(faction);
        cell.copy_standing_flags(beneath);
        cell
    }

    pub(crate) fn copy_standing_flags(&mut self, beneath: &Cell) {
        self.on_platform = beneath.on_platform;
        self.is_bridge = beneath.is_bridge;
        self.is_river = beneath.is_river;
        self.is_debris = beneath.is_debris;
        self.overgrown = beneath.overgrown;
    }

    /// The terrain a unit leaves behind, resolved from its standing flags.
    pub fn terrain_beneath(&self) -> Cell {
        let mut cell = if self.is_bridge {
            Cell::bridge(self.is_river)
        } else if self.is_debris {
            Cell::debris()
        } else if self.is_river {
            Cell::river("Toxic River")
        } else {
            Cell::open_ground()
        };
        if self.on_platform {
            cell.mark_platform();
        }
        if self.overgrown {
            cell.mark_overgrown();
        }
        cell
    }

    pub(crate) fn mark_platform(&mut self) {
        self.on_platform = true;
        if !self.description.ends_with(PLATFORM_TAG) {
            self.description.push_str(PLATFORM_TAG);
        }
    }

    /// Sets the overgrowth flag; only floor is re-skinned.
    pub(crate) fn mark_overgrown(&mut self) {
        self.overgrown = true;
        if !self.description.contains(OVERGROWN_TAG) {
            self.description.push_str(OVERGROWN_TAG);
        }
        if self.kind == CellKind::Floor {
            self.category = "terrain-fungal".to_string();
            self.glyph = glyphs::FUNGAL;
        }
    }
}
