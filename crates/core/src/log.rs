//! Structured battle log. Every event renders a human-readable status line
//! through `Display`; the events themselves are what tests assert against.

use std::fmt;

use tracing::debug;

use crate::outcome::Rejection;
use crate::types::{Faction, PivotDirection, Pos, Winner};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleEvent {
    ScenarioLoaded { name: String, description: String },
    ScenarioRejected { reason: String },
    Briefing(String),
    DefenderStrength { count: u32 },
    Deployed { faction: Faction, placed: u32 },
    PriorityTargetMarked { pos: Pos },
    RoundEnded { round: u32 },

    BombSitesMarked { count: usize },
    BombPlanted { index: usize, counter: u32 },
    BombRearmed { index: usize },
    BombDisarmed { index: usize },
    DisarmFailed { index: usize, roll: i32 },
    CriticalFailure { index: usize },
    BombTimerRolled { index: usize, roll: i32, counter: u32, total: i32 },
    BombCounterIncreased { index: usize, counter: u32 },
    BombDetonated { index: usize },
    UnitCaughtInBlast { pos: Pos },

    PlatformEstablished { caskets: usize },
    PlatformRolled { roll: i32, bonus: u32, total: i32 },
    PlatformDescending,
    PlatformHolds { needed: i32 },
    CasketSecured { index: usize },
    UnitsLeftBehind { attackers: usize, defenders: usize },
    LevelRegenerated { caskets: usize },
    AttackersRedeployed { count: usize },
    LootStatus { secured: usize, total: usize },

    FungalHorrorEstablished { pos: Pos, max_markers: usize },
    FungalGrowthRoll { index: usize, roll: i32 },
    FungusSpread { pos: Pos },
    FungalOverrun { markers: usize },
    SporeExposure { pos: Pos, roll: i32 },

    RiverConstructed { debris: usize },
    BridgeRolled { roll: i32 },
    BridgeHolds,
    BridgePivoting { direction: PivotDirection },
    UnitRotated { to: Pos },
    UnitFellIntoRiver { at: Pos },
    UnitFellOnShore { at: Pos },
    UnitDisplaced { at: Pos },

    ReinforcementsRequested { count: u32 },
    ReinforcementsArrived { count: u32 },
    ReinforcementsBlocked,

    UnitMoved { to: Pos },
    UnitLostInRiver { at: Pos },
    DebrisLeap { at: Pos },
    DebrisCapsized { at: Pos },

    AuspexToggled { active: bool },
    BattleResolved { winner: Winner, message: String },
    GameSaved { slot: String },
    GameLoaded { round: u32 },
    Rejected(Rejection),
}

impl fmt::Display for BattleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BattleEvent::*;
        match self {
            ScenarioLoaded { name, description } => {
                write!(f, "=== {} === {description}", name.to_uppercase())
            }
            ScenarioRejected { reason } => {
                write!(f, "Failed to load valid scenario ({reason}). Aborting generation.")
            }
            Briefing(text) => f.write_str(text),
            DefenderStrength { count } => write!(f, "DEFENDER STRENGTH: {count} detected."),
            Deployed { faction, placed } => {
                write!(f, "{}: {placed} deployed.", faction.plural().to_uppercase())
            }
            PriorityTargetMarked { pos } => write!(f, "Priority target marked at {pos} [!]"),
            RoundEnded { round } => write!(f, "--- END OF ROUND {round} ---"),

            BombSitesMarked { count } => write!(f, "{count} bomb sites identified and marked."),
            BombPlanted { index, counter } => {
                write!(f, "Bomb planted at site {}! Timer: {counter}", index + 1)
            }
            BombRearmed { index } => write!(f, "Bomb {} REARMED!", index + 1),
            BombDisarmed { index } => write!(f, "Bomb {} DISARMED by defender!", index + 1),
            DisarmFailed { roll, .. } => write!(f, "Disarm attempt failed (rolled {roll})"),
            CriticalFailure { .. } => f.write_str("CRITICAL FAILURE! Bomb detonates!"),
            BombTimerRolled { index, roll, counter, total } => {
                write!(f, "Bomb {}: Rolled {roll} + {counter} counter = {total}", index + 1)
            }
            BombCounterIncreased { index, counter } => {
                write!(f, "Bomb {} counter increased to {counter}", index + 1)
            }
            BombDetonated { index } => write!(f, "*** DETONATION! BOMB {} ***", index + 1),
            UnitCaughtInBlast { pos } => {
                write!(f, "Unit at {pos} caught in blast! (Str 6, D3 damage)")
            }

            PlatformEstablished { caskets } => write!(
                f,
                "Platform established. {caskets} loot caskets placed. \
                 Platform will descend on 6+ (cumulative +1 per turn)."
            ),
            PlatformRolled { roll, bonus, total } => {
                write!(f, "Platform stability: Rolled {roll} + {bonus} bonus = {total}")
            }
            PlatformDescending => f.write_str("*** PLATFORM DESCENDING! ***"),
            PlatformHolds { needed } => {
                write!(f, "Platform holds steady (need {needed}+ next turn).")
            }
            CasketSecured { index } => write!(f, "Loot casket {} secured on platform!", index + 1),
            UnitsLeftBehind { attackers, defenders } => write!(
                f,
                "{attackers} attackers and {defenders} defenders left behind as platform descends..."
            ),
            LevelRegenerated { caskets } => write!(f, "New level: {caskets} loot caskets placed."),
            AttackersRedeployed { count } => {
                write!(f, "{count} attackers redeployed around new platform.")
            }
            LootStatus { secured, total } => {
                write!(f, "Loot status: {secured}/{total} caskets on platform.")
            }

            FungalHorrorEstablished { pos, max_markers } => write!(
                f,
                "Central fungal horror established at {pos}. \
                 Game ends at {max_markers} markers or no fighters remain."
            ),
            FungalGrowthRoll { index, roll } => {
                write!(f, "Fungal marker {}: Growth roll {roll} (need 4+)", index + 1)
            }
            FungusSpread { pos } => write!(f, "Fungus SPREADS to {pos}!"),
            FungalOverrun { markers } => {
                write!(f, "CRITICAL: {markers} fungal markers! Board is overrun!")
            }
            SporeExposure { pos, roll } => {
                write!(f, "Unit at {pos} coated in flesh-eating spores! (Roll: {roll})")
            }

            RiverConstructed { debris } => write!(
                f,
                "Bridge secured. River toxic levels critical. {debris} flotsam drifting."
            ),
            BridgeRolled { roll } => write!(f, "Bridge Mechanism: Rolled {roll}"),
            BridgeHolds => f.write_str("The bridge remains stationary."),
            BridgePivoting { direction } => {
                let label = match direction {
                    PivotDirection::Clockwise => "RIGHT",
                    PivotDirection::CounterClockwise => "LEFT",
                };
                write!(f, "WARNING: Bridge pivoting {label}!")
            }
            UnitRotated { to } => write!(f, "Unit moved with bridge to {to}"),
            UnitFellIntoRiver { at } => write!(f, "Unit fell into Toxic River at {at}! GONE!"),
            UnitFellOnShore { at } => write!(f, "Unit fell onto shore at {at}!"),
            UnitDisplaced { at } => write!(f, "No room to land at {at}! Unit lost in the crush."),

            ReinforcementsRequested { count } => {
                write!(f, "REINFORCEMENTS REQUESTED. INCOMING: {count}")
            }
            ReinforcementsArrived { count } => {
                write!(f, "Success: {count} units entered the sector.")
            }
            ReinforcementsBlocked => f.write_str("WARNING: Entry points blocked or unsafe."),

            UnitMoved { to } => write!(f, "Moving to coordinate {to}."),
            UnitLostInRiver { at } => write!(f, "Unit falls into Toxic River at {at}! GONE!"),
            DebrisLeap { at } => write!(f, "Unit leaps onto Debris at {at}. Testing stability..."),
            DebrisCapsized { .. } => {
                f.write_str("...Debris capsizes! Unit falls into Toxic River! GONE!")
            }

            AuspexToggled { active } => {
                write!(f, "Auspex Scan: {}", if *active { "ACTIVE" } else { "STANDBY" })
            }
            BattleResolved { message, .. } => f.write_str(message),
            GameSaved { slot } => write!(f, "Game Saved to '{slot}'"),
            GameLoaded { round } => write!(f, "Game Loaded Successfully. Round: {round}"),
            Rejected(rejection) => write!(f, "{rejection}"),
        }
    }
}

/// Append-only gameplay log. Every push is mirrored to `tracing` at debug
/// level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleLog {
    events: Vec<BattleEvent>,
}

impl BattleLog {
    pub fn push(&mut self, event: BattleEvent) {
        debug!(target: "auspex::log", "{event}");
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&BattleEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events pushed since `mark`, a length previously read from [`Self::len`].
    pub fn since(&self, mark: usize) -> &[BattleEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }
}
