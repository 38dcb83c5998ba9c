//! The built-in scenario templates. Definitions are plain data; nothing here
//! is mutated during a battle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKey {
    Bushwhack,
    Scrag,
    Mayhem,
    ManufactorumRaid,
    Conveyer,
    FungalHorror,
    TollBridge,
}

impl ScenarioKey {
    pub const ALL: [ScenarioKey; 7] = [
        ScenarioKey::Bushwhack,
        ScenarioKey::Scrag,
        ScenarioKey::Mayhem,
        ScenarioKey::ManufactorumRaid,
        ScenarioKey::Conveyer,
        ScenarioKey::FungalHorror,
        ScenarioKey::TollBridge,
    ];

    /// The pool a battle draws from when no scenario is requested.
    pub const AMBUSHES: [ScenarioKey; 3] =
        [ScenarioKey::Bushwhack, ScenarioKey::Scrag, ScenarioKey::Mayhem];

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioKey::Bushwhack => "bushwhack",
            ScenarioKey::Scrag => "scrag",
            ScenarioKey::Mayhem => "mayhem",
            ScenarioKey::ManufactorumRaid => "manufactorumRaid",
            ScenarioKey::Conveyer => "conveyer",
            ScenarioKey::FungalHorror => "fungalHorror",
            ScenarioKey::TollBridge => "tollBridge",
        }
    }

    pub fn definition(self) -> ScenarioDefinition {
        match self {
            ScenarioKey::Bushwhack => ambush(
                AmbushKind::Bushwhack,
                "Bushwhack",
                "Target Enemy Leaders/Champions",
                "Take out enemy leaders",
            ),
            ScenarioKey::Scrag => ambush(
                AmbushKind::Scrag,
                "Scrag",
                "Target nominated fighter (Priority Target)",
                "Eliminate priority target",
            ),
            ScenarioKey::Mayhem => ambush(
                AmbushKind::Mayhem,
                "Mayhem",
                "Serious Injuries & Escape via short edge",
                "Cause casualties and extract",
            ),
            ScenarioKey::ManufactorumRaid => manufactorum_raid(),
            ScenarioKey::Conveyer => conveyer(),
            ScenarioKey::FungalHorror => fungal_horror(),
            ScenarioKey::TollBridge => toll_bridge(),
        }
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKey {
    type Err = ScenarioError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted: String = raw.chars().filter(|c| *c != '-' && *c != '_').collect();
        ScenarioKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ScenarioError::UnknownKey(raw.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmbushKind {
    Bushwhack,
    Scrag,
    Mayhem,
}

/// Which behaviour set drives a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Behaviour {
    Ambush(AmbushKind),
    ManufactorumRaid,
    Conveyer,
    FungalHorror,
    TollBridge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deployment {
    ShortEdge,
    OppositeEdge,
    Standard,
    AroundPlatform,
    OnPlatform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitCount {
    Fixed(u32),
    /// Player-built force; the simulator fields six.
    Custom,
    /// D3 plus a flat bonus.
    D3Plus(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForceConfig {
    pub deployment: Deployment,
    pub count: UnitCount,
    pub objective: Option<String>,
    pub reinforcements: bool,
    pub reinforcement_rate: Option<String>,
}

impl ForceConfig {
    fn new(deployment: Deployment, count: UnitCount) -> Self {
        Self { deployment, count, objective: None, reinforcements: false, reinforcement_rate: None }
    }

    fn objective(mut self, objective: &str) -> Self {
        self.objective = Some(objective.to_string());
        self
    }

    fn with_reinforcements(mut self) -> Self {
        self.reinforcements = true;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BombRules {
    pub count: usize,
    pub min_distance_from_attacker: i32,
    pub min_distance_between_bombs: f64,
    pub explosion_strength: u32,
    pub detonation_threshold: i32,
    pub blast_radius: i32,
    pub disarm_target: i32,
}

impl Default for BombRules {
    fn default() -> Self {
        Self {
            count: 3,
            min_distance_from_attacker: 8,
            min_distance_between_bombs: 12.0,
            explosion_strength: 6,
            detonation_threshold: 7,
            blast_radius: 3,
            disarm_target: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlatformRules {
    pub radius: i32,
    pub move_threshold: i32,
    pub loot_casket_count: usize,
}

impl Default for PlatformRules {
    fn default() -> Self {
        Self { radius: 6, move_threshold: 6, loot_casket_count: 4 }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FungalRules {
    pub initial_radius: i32,
    pub spread_on: i32,
    pub spread_distance: f64,
    pub max_markers: usize,
    pub line_of_sight_limit: i32,
}

impl Default for FungalRules {
    fn default() -> Self {
        Self {
            initial_radius: 6,
            spread_on: 4,
            spread_distance: 12.0,
            max_markers: 9,
            line_of_sight_limit: 3,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioRules {
    pub reinforcement_start: Option<u32>,
    pub max_rounds: Option<u32>,
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardText {
    pub victory: String,
    pub experience: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewards {
    pub attacker: RewardText,
    pub defender: RewardText,
}

/// An immutable scenario template. `name`, `attacker` and `defender` are
/// optional only so that malformed definitions can be represented and
/// rejected by [`ScenarioDefinition::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioDefinition {
    pub key: Option<ScenarioKey>,
    pub name: Option<String>,
    pub description: String,
    pub source: String,
    pub attacker: Option<ForceConfig>,
    pub defender: Option<ForceConfig>,
    pub bombs: Option<BombRules>,
    pub platform: Option<PlatformRules>,
    pub fungal_growth: Option<FungalRules>,
    pub rules: ScenarioRules,
    pub rewards: Option<Rewards>,
    pub behaviour: Behaviour,
}

/// A definition that passed validation; the required fields are unwrapped.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub attacker: ForceConfig,
    pub defender: ForceConfig,
    pub definition: ScenarioDefinition,
}

impl ScenarioDefinition {
    pub fn validate(self) -> Result<Scenario, ScenarioError> {
        let mut missing = Vec::new();
        if self.name.as_deref().is_none_or(str::is_empty) {
            missing.push("name");
        }
        if self.attacker.is_none() {
            missing.push("attacker");
        }
        if self.defender.is_none() {
            missing.push("defender");
        }
        match (&self.name, &self.attacker, &self.defender) {
            (Some(name), Some(attacker), Some(defender)) if missing.is_empty() => Ok(Scenario {
                name: name.clone(),
                attacker: attacker.clone(),
                defender: defender.clone(),
                definition: self,
            }),
            _ => Err(ScenarioError::MissingFields(missing)),
        }
    }
}

impl Scenario {
    pub fn key(&self) -> Option<ScenarioKey> {
        self.definition.key
    }

    pub fn behaviour(&self) -> Behaviour {
        self.definition.behaviour
    }

    pub fn rules(&self) -> &ScenarioRules {
        &self.definition.rules
    }
}

fn base(key: ScenarioKey, name: &str, description: &str, source: &str) -> ScenarioDefinition {
    ScenarioDefinition {
        key: Some(key),
        name: Some(name.to_string()),
        description: description.to_string(),
        source: source.to_string(),
        attacker: None,
        defender: None,
        bombs: None,
        platform: None,
        fungal_growth: None,
        rules: ScenarioRules::default(),
        rewards: None,
        behaviour: Behaviour::Ambush(AmbushKind::Bushwhack),
    }
}

fn rewards(attacker: (&str, &str), defender: (&str, &str)) -> Option<Rewards> {
    Some(Rewards {
        attacker: RewardText { victory: attacker.0.to_string(), experience: attacker.1.to_string() },
        defender: RewardText { victory: defender.0.to_string(), experience: defender.1.to_string() },
    })
}

fn ambush(kind: AmbushKind, name: &str, description: &str, objective: &str) -> ScenarioDefinition {
    let key = match kind {
        AmbushKind::Bushwhack => ScenarioKey::Bushwhack,
        AmbushKind::Scrag => ScenarioKey::Scrag,
        AmbushKind::Mayhem => ScenarioKey::Mayhem,
    };
    ScenarioDefinition {
        attacker: Some(ForceConfig::new(Deployment::ShortEdge, UnitCount::Fixed(6)).objective(objective)),
        defender: Some(
            ForceConfig::new(Deployment::OppositeEdge, UnitCount::D3Plus(2)).with_reinforcements(),
        ),
        behaviour: Behaviour::Ambush(kind),
        ..base(key, name, description, "Zone Mortalis Ambush")
    }
}

fn manufactorum_raid() -> ScenarioDefinition {
    let mut defender =
        ForceConfig::new(Deployment::OppositeEdge, UnitCount::D3Plus(5)).with_reinforcements();
    defender.reinforcement_rate = Some("D3 per round".to_string());
    ScenarioDefinition {
        attacker: Some(
            ForceConfig::new(Deployment::ShortEdge, UnitCount::Custom)
                .objective("Plant and detonate 3 bombs"),
        ),
        defender: Some(defender),
        bombs: Some(BombRules::default()),
        rules: ScenarioRules {
            reinforcement_start: Some(2),
            max_rounds: None,
            notes: vec!["Industrial terrain is functioning (activates on 3+)".to_string()],
        },
        rewards: rewards(
            ("D3 Reputation if all bombs explode", "1 XP per fighter + 1 XP per bomb planted/rearmed"),
            (
                "2D6x10 credits, D6 Reputation (none exploded) or D3 Reputation (1-2 exploded)",
                "1 XP per fighter + D3 XP per bomb disarmed",
            ),
        ),
        behaviour: Behaviour::ManufactorumRaid,
        ..base(
            ScenarioKey::ManufactorumRaid,
            "Manufactorum Raid",
            "Plant bombs on vital machinery",
            "The Book of Peril, p80",
        )
    }
}

fn conveyer() -> ScenarioDefinition {
    ScenarioDefinition {
        attacker: Some(
            ForceConfig::new(Deployment::AroundPlatform, UnitCount::Fixed(10))
                .objective("Eliminate defenders or survive 9 rounds"),
        ),
        defender: Some(
            ForceConfig::new(Deployment::OnPlatform, UnitCount::Fixed(10))
                .objective("Hold platform for 9 rounds"),
        ),
        platform: Some(PlatformRules::default()),
        rules: ScenarioRules {
            reinforcement_start: None,
            max_rounds: Some(9),
            notes: vec!["Platform movement bonus: cumulative +1 per round stationary".to_string()],
        },
        rewards: rewards(
            (
                "D3 Reputation if game ends before round 9",
                "1 XP per fighter + 1 XP for being on platform when it moves",
            ),
            (
                "D6x10 credits per loot casket on platform + D3 Reputation",
                "1 XP per fighter + 1 XP for being on platform at end",
            ),
        ),
        behaviour: Behaviour::Conveyer,
        ..base(
            ScenarioKey::Conveyer,
            "The Conveyer",
            "Descend through the hive on a moving platform",
            "The Book of Peril, p82",
        )
    }
}

fn fungal_horror() -> ScenarioDefinition {
    let survive = "Survive the spreading horror";
    ScenarioDefinition {
        attacker: Some(ForceConfig::new(Deployment::Standard, UnitCount::Fixed(10)).objective(survive)),
        defender: Some(ForceConfig::new(Deployment::Standard, UnitCount::Fixed(10)).objective(survive)),
        fungal_growth: Some(FungalRules::default()),
        rules: ScenarioRules {
            reinforcement_start: None,
            max_rounds: None,
            notes: vec![
                "Overgrowth burns like Blaze".to_string(),
                "Seriously injured fighters go Out of Action".to_string(),
                "One move only unless wearing a respirator".to_string(),
            ],
        },
        rewards: rewards(
            ("D3 Reputation if survived", "1 XP per fighter"),
            ("D3 Reputation if survived", "1 XP per fighter"),
        ),
        behaviour: Behaviour::FungalHorror,
        ..base(
            ScenarioKey::FungalHorror,
            "Fungal Horror",
            "Survive a rapidly growing fungal jungle",
            "The Book of Peril, p84",
        )
    }
}

fn toll_bridge() -> ScenarioDefinition {
    let control = "Control the bridge";
    ScenarioDefinition {
        attacker: Some(ForceConfig::new(Deployment::Standard, UnitCount::Fixed(10)).objective(control)),
        defender: Some(ForceConfig::new(Deployment::Standard, UnitCount::Fixed(10)).objective(control)),
        rules: ScenarioRules {
            reinforcement_start: None,
            max_rounds: Some(10),
            notes: vec!["Toxic river".to_string(), "Bridge pivots from round 3".to_string()],
        },
        behaviour: Behaviour::TollBridge,
        ..base(
            ScenarioKey::TollBridge,
            "Toll Bridge",
            "Control the bridge over the toxic river",
            "The Book of Peril, p86",
        )
    }
}
