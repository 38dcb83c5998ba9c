//! Structured results of player-facing operations.
//!
//! Invalid requests are no-ops that come back as a [`Rejection`]; stochastic
//! losses (river, capsized debris, detonation) are ordinary variants.

use std::fmt;

use crate::types::{CellKind, Pos, VictoryCheck};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds(Pos),
    NoUnitAt(Pos),
    Blocked { pos: Pos, kind: CellKind },
    NotABombSite(Pos),
    NotAdjacent,
    CannotInteract,
    BombAlreadyPlanted,
    BombNotPlanted,
    BombNotArmed,
    BombAlreadyArmed,
    BombExploded,
    BattleResolved,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OutOfBounds(pos) => write!(f, "Coordinate {pos} is outside the sector."),
            Rejection::NoUnitAt(pos) => write!(f, "No unit at {pos}."),
            Rejection::Blocked { pos, kind } => {
                write!(f, "Movement blocked: {pos} is {kind:?} terrain.")
            }
            Rejection::NotABombSite(pos) => write!(f, "No bomb site at {pos}."),
            Rejection::NotAdjacent => f.write_str("Unit must be adjacent to interact with bomb."),
            Rejection::CannotInteract => f.write_str("Cannot interact with this bomb."),
            Rejection::BombAlreadyPlanted => f.write_str("Bomb is already planted."),
            Rejection::BombNotPlanted => f.write_str("Bomb has not been planted."),
            Rejection::BombNotArmed => f.write_str("Bomb is not armed."),
            Rejection::BombAlreadyArmed => f.write_str("Bomb is already armed."),
            Rejection::BombExploded => f.write_str("Bomb has already detonated."),
            Rejection::BattleResolved => {
                f.write_str("The battle is over; no further rounds can be played.")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Pos, to: Pos },
    LostInRiver { at: Pos },
    CapsizedOnDebris { at: Pos },
    Rejected(Rejection),
}

impl MoveOutcome {
    /// True when the unit now stands on the destination.
    pub fn arrived(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }

    pub fn unit_lost(&self) -> bool {
        matches!(self, MoveOutcome::LostInRiver { .. } | MoveOutcome::CapsizedOnDebris { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisarmResult {
    Disarmed,
    Failed { roll: i32 },
    CriticalFailure { roll: i32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Planted { counter: u32 },
    Rearmed,
    Disarm(DisarmResult),
    Rejected(Rejection),
}

impl ActionOutcome {
    /// The boolean success flag of a scenario action. A failed disarm
    /// attempt reports `false` even though it consumed dice.
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Planted { .. }
                | ActionOutcome::Rearmed
                | ActionOutcome::Disarm(DisarmResult::Disarmed)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    Resolved(VictoryCheck),
    Refused(Rejection),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u32,
    pub outcome: RoundOutcome,
}

impl RoundReport {
    pub fn resolved(&self) -> bool {
        matches!(self.outcome, RoundOutcome::Resolved(_))
    }
}
