use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn distance(self, other: Pos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Floor,
    Wall,
    Rubble,
    Hazard,
    Objective,
    Unit,
    Loot,
}

impl CellKind {
    /// Kinds that stop a sight ray after the blocking cell itself.
    pub fn is_opaque(self) -> bool {
        matches!(self, CellKind::Wall)
    }

    pub fn is_open_ground(self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Rubble)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Attacker,
    Defender,
}

impl Faction {
    pub fn glyph(self) -> char {
        match self {
            Faction::Attacker => 'M',
            Faction::Defender => 'G',
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            Faction::Attacker => "unit-attacker",
            Faction::Defender => "unit-defender",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Faction::Attacker => "Attackers",
            Faction::Defender => "Defenders",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapType {
    #[default]
    #[serde(rename = "zm")]
    ZoneMortalis,
    #[serde(rename = "sm")]
    SectorMechanicus,
}

impl MapType {
    pub fn code(self) -> &'static str {
        match self {
            MapType::ZoneMortalis => "zm",
            MapType::SectorMechanicus => "sm",
        }
    }
}

impl FromStr for MapType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "zm" | "zone-mortalis" => Ok(MapType::ZoneMortalis),
            "sm" | "sector-mechanicus" => Ok(MapType::SectorMechanicus),
            other => Err(format!("unknown map type '{other}' (expected zm or sm)")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Attacker,
    Defender,
    Draw,
}

impl From<Faction> for Winner {
    fn from(faction: Faction) -> Self {
        match faction {
            Faction::Attacker => Winner::Attacker,
            Faction::Defender => Winner::Defender,
        }
    }
}

/// Result of a scenario's end-of-round victory check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryCheck {
    Continue,
    Ended { winner: Winner, message: String },
}

impl VictoryCheck {
    pub fn ended(&self) -> bool {
        matches!(self, VictoryCheck::Ended { .. })
    }

    pub fn winner(&self) -> Option<Winner> {
        match self {
            VictoryCheck::Continue => None,
            VictoryCheck::Ended { winner, .. } => Some(*winner),
        }
    }

    pub(crate) fn ended_with(winner: impl Into<Winner>, message: impl Into<String>) -> Self {
        VictoryCheck::Ended { winner: winner.into(), message: message.into() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Setup,
    Active,
    Resolved { winner: Winner, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotDirection {
    Clockwise,
    CounterClockwise,
}

impl PivotDirection {
    /// Rotates an offset from the pivot centre by a quarter turn.
    pub fn rotate(self, rel_x: i32, rel_y: i32) -> (i32, i32) {
        match self {
            PivotDirection::Clockwise => (-rel_y, rel_x),
            PivotDirection::CounterClockwise => (rel_y, -rel_x),
        }
    }
}

/// A unit on the board as seen through the roster view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitView {
    pub pos: Pos,
    pub faction: Faction,
    pub description: String,
    pub priority: bool,
    pub prone: bool,
    pub on_platform: bool,
}
