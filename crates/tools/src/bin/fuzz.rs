use anyhow::{Result, bail};
use auspex_core::{Battlefield, BattlefieldConfig, MemorySlotStore, Pos, ScenarioKey};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    steps: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn offset(rng: &mut ChaCha8Rng) -> i32 {
    (rng.next_u64() % 5) as i32 - 2
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting Fuzz harness on seed {} for max {} steps...", args.seed, args.steps);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let key = choose(&mut rng, &ScenarioKey::ALL);
    let mut bf = Battlefield::new(BattlefieldConfig::default(), rng.next_u32());
    bf.generate(Some(key))?;
    let mut store = MemorySlotStore::new();

    for step in 0..args.steps {
        match rng.next_u64() % 8 {
            0..=3 => {
                let roster = bf.roster();
                if roster.is_empty() {
                    continue;
                }
                let from = choose(&mut rng, &roster).pos;
                let to = Pos::new(from.x + offset(&mut rng), from.y + offset(&mut rng));
                bf.move_unit(from, to);
            }
            4 => {
                // Only the raid accepts bomb actions; anything else is expected to refuse
                let action = choose(&mut rng, &["plantBomb", "disarmBomb", "rearmBomb"]);
                let _ = bf.invoke_action(action, (rng.next_u64() % 3) as usize);
            }
            5 => {
                bf.toggle_auspex();
            }
            6 => {
                let before = bf.snapshot_hash();
                bf.save_to(&mut store, "fuzz")?;
                bf.load_from(&store, "fuzz")?;
                if bf.snapshot_hash() != before {
                    bail!("Invariant failed: save/load changed the battle at step {step}");
                }
            }
            _ => {
                let report = bf.end_round();
                if report.resolved() {
                    println!("Resolved in round {}: {}", report.round, bf.status_message());
                    break;
                }
            }
        }

        // Assert invariants
        let grid = bf.grid();
        for unit in bf.roster() {
            assert!(grid.in_bounds(unit.pos), "Invariant failed: unit outside the grid");
        }
        if !bf.auspex_mode() {
            assert!(
                grid.cells().all(|(_, cell)| !cell.visible),
                "Invariant failed: visibility left on with auspex off"
            );
        }
    }

    println!("Fuzzing {key} completed successfully at round {}.", bf.round());
    Ok(())
}
