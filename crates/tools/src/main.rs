//! `auspex`: headless front end for the battlefield simulator.
//!
//! Generates and plays battles, prints the map as text and manages save
//! slots on disk.
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use auspex_core::{
    BattlePhase, Battlefield, BattlefieldConfig, Faction, FileSlotStore, MapType, RoundOutcome,
    ScenarioKey, ScenarioRuntime, Winner,
};
use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const APP_NAME: &str = "TacticalAuspex";
const DEFAULT_FILTER: &str = "auspex=info";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with battlefield settings; flags below override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding save slots
    #[arg(long, global = true)]
    slots: Option<PathBuf>,

    /// Print a JSON summary instead of the map
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scenarios
    Scenarios,
    /// Generate a battlefield and print it
    Generate(BattleArgs),
    /// Generate a battlefield and advance rounds until it resolves
    Play {
        #[command(flatten)]
        battle: BattleArgs,

        /// Maximum rounds to play
        #[arg(short, long, default_value_t = 10)]
        rounds: u32,

        /// Plant every bomb before the first round (Manufactorum Raid only)
        #[arg(long)]
        plant: bool,
    },
    /// Load a saved battle, optionally advancing it further
    Load {
        slot: String,

        #[arg(short, long, default_value_t = 0)]
        rounds: u32,
    },
    /// List save slots, or delete one
    Slots {
        #[arg(long)]
        delete: Option<String>,
    },
}

#[derive(Args)]
struct BattleArgs {
    #[arg(short, long, default_value_t = 42)]
    seed: u32,

    /// Scenario key, e.g. `manufactorum-raid`; a random ambush when omitted
    #[arg(long)]
    scenario: Option<ScenarioKey>,

    /// Map type: `zm` (Zone Mortalis) or `sm` (Sector Mechanicus)
    #[arg(short, long)]
    map: Option<MapType>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Start with the auspex sweep active
    #[arg(long)]
    auspex: bool,

    /// Save the battle to this slot when done
    #[arg(long)]
    save: Option<String>,
}

#[derive(Serialize)]
struct Summary {
    scenario: Option<String>,
    seed: u32,
    round: u32,
    attackers: usize,
    defenders: usize,
    winner: Option<Winner>,
    status: String,
    snapshot_hash: String,
}

impl Summary {
    fn of(bf: &Battlefield) -> Self {
        let roster = bf.roster();
        let count = |faction| roster.iter().filter(|unit| unit.faction == faction).count();
        Self {
            scenario: bf.scenario().map(|scenario| scenario.name.clone()),
            seed: bf.rng().seed(),
            round: bf.round(),
            attackers: count(Faction::Attacker),
            defenders: count(Faction::Defender),
            winner: match bf.phase() {
                BattlePhase::Resolved { winner, .. } => Some(*winner),
                _ => None,
            },
            status: bf.status_message(),
            snapshot_hash: format!("{:#018x}", bf.snapshot_hash()),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn default_slot_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_dir().join("slots"))
}

fn slot_store(cli_dir: Option<&Path>) -> Result<FileSlotStore> {
    let dir = match cli_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_slot_dir().context("no home directory for save slots; pass --slots")?,
    };
    debug!(target: "auspex::cli", dir = %dir.display(), "using slot directory");
    Ok(FileSlotStore::new(dir))
}

fn load_config(path: Option<&Path>, args: &BattleArgs) -> Result<BattlefieldConfig> {
    let mut config = match path {
        Some(path) => BattlefieldConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => BattlefieldConfig::default(),
    };
    if let Some(map) = args.map {
        config.map_type = map;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    config.validate().context("Invalid battlefield settings")?;
    Ok(config)
}

fn print_battle(bf: &Battlefield, json: bool) -> Result<()> {
    if json {
        let summary = serde_json::to_string_pretty(&Summary::of(bf))
            .context("Failed to serialize summary")?;
        println!("{summary}");
        return Ok(());
    }
    print!("{}", bf.render_ascii());
    if let Some(scenario) = bf.scenario() {
        println!("Scenario: {} ({})", scenario.name, scenario.definition.source);
    }
    println!("Round: {}", bf.round());
    for unit in bf.roster() {
        let tags = [(unit.priority, " [PRIORITY]"), (unit.prone, " [PRONE]")]
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, tag)| *tag)
            .collect::<String>();
        println!("  {:?} {} at {}{tags}", unit.faction, unit.description, unit.pos);
    }
    println!("Status: {}", bf.status_message());
    println!("Snapshot Hash: {:#018x}", bf.snapshot_hash());
    Ok(())
}

fn generate(cli: &Cli, args: &BattleArgs) -> Result<Battlefield> {
    let config = load_config(cli.config.as_deref(), args)?;
    let mut bf = Battlefield::new(config, args.seed);
    bf.generate(args.scenario).context("Failed to generate battlefield")?;
    if args.auspex {
        bf.toggle_auspex();
    }
    Ok(bf)
}

fn play_rounds(bf: &mut Battlefield, rounds: u32) {
    for _ in 0..rounds {
        let report = bf.end_round();
        info!(target: "auspex::cli", round = report.round, status = %bf.status_message(), "round played");
        match report.outcome {
            RoundOutcome::Continue => {}
            RoundOutcome::Resolved(_) | RoundOutcome::Refused(_) => break,
        }
    }
}

fn save_if_requested(cli: &Cli, bf: &mut Battlefield, slot: Option<&str>) -> Result<()> {
    let Some(slot) = slot else {
        return Ok(());
    };
    let mut store = slot_store(cli.slots.as_deref())?;
    bf.save_to(&mut store, slot).with_context(|| format!("Failed to save slot '{slot}'"))?;
    println!("Saved to slot '{slot}' in {}", store.root().display());
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Scenarios => {
            for key in ScenarioKey::ALL {
                let definition = key.definition();
                println!(
                    "{:<18} {:<20} {}",
                    key.as_str(),
                    definition.name.unwrap_or_default(),
                    definition.description
                );
            }
        }
        Commands::Generate(args) => {
            let mut bf = generate(cli, args)?;
            print_battle(&bf, cli.json)?;
            save_if_requested(cli, &mut bf, args.save.as_deref())?;
        }
        Commands::Play { battle, rounds, plant } => {
            let mut bf = generate(cli, battle)?;
            if *plant {
                let bombs = bf.runtime().and_then(ScenarioRuntime::raid).map(|raid| raid.bombs.len());
                let Some(bombs) = bombs else {
                    bail!("--plant needs the manufactorum-raid scenario");
                };
                for index in 0..bombs {
                    bf.invoke_action("plantBomb", index)
                        .with_context(|| format!("Failed to plant bomb {index}"))?;
                }
            }
            play_rounds(&mut bf, *rounds);
            print_battle(&bf, cli.json)?;
            save_if_requested(cli, &mut bf, battle.save.as_deref())?;
        }
        Commands::Load { slot, rounds } => {
            let store = slot_store(cli.slots.as_deref())?;
            let mut bf = Battlefield::new(BattlefieldConfig::default(), 0);
            let found = bf
                .load_from(&store, slot)
                .with_context(|| format!("Failed to load slot '{slot}'"))?;
            if !found {
                bail!("Slot '{slot}' is empty");
            }
            play_rounds(&mut bf, *rounds);
            print_battle(&bf, cli.json)?;
        }
        Commands::Slots { delete } => {
            let store = slot_store(cli.slots.as_deref())?;
            if let Some(slot) = delete {
                let removed = store.delete_slot(slot).context("Failed to delete slot")?;
                println!("{}", if removed { "Deleted." } else { "No such slot." });
            }
            for slot in store.list_slots().context("Failed to list slots")? {
                println!("{slot}");
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(&cli)
}
