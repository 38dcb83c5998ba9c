use auspex_core::{
    Battlefield, BattlefieldConfig, BattlePhase, MemorySlotStore, MoveOutcome, Pos,
    ScenarioKey, ScenarioRuntime,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn below(rng: &mut ChaCha8Rng, bound: usize) -> usize {
    rng.next_u64() as usize % bound.max(1)
}

#[derive(Clone, Copy, Debug)]
enum Step {
    Move,
    Bomb,
    Interact,
    Auspex,
    EndRound,
    SaveLoad,
}

fn check_invariants(bf: &Battlefield, width: usize, height: usize) -> Result<(), String> {
    let grid = bf.grid();
    if (grid.width(), grid.height()) != (width, height) {
        return Err(format!("grid resized to {}x{}", grid.width(), grid.height()));
    }
    for unit in bf.roster() {
        if !grid.in_bounds(unit.pos) {
            return Err(format!("unit outside the grid at {}", unit.pos));
        }
    }
    if !bf.auspex_mode() && grid.cells().any(|(_, cell)| cell.visible) {
        return Err("visibility flags left set with auspex off".to_string());
    }
    match bf.runtime() {
        Some(ScenarioRuntime::Raid(raid)) => {
            for bomb in &raid.bombs {
                if bomb.armed && !bomb.planted {
                    return Err("bomb armed without being planted".to_string());
                }
            }
        }
        Some(ScenarioRuntime::Fungal(fungal)) if fungal.markers.len() > 9 => {
            return Err(format!("{} fungal markers", fungal.markers.len()));
        }
        _ => {}
    }
    Ok(())
}

fn run_fuzz_simulation(seed: u32, choice_seed: u64, steps: u32) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(choice_seed);
    let key = choose(&mut rng, &ScenarioKey::ALL);
    let config = BattlefieldConfig::default();
    let (width, height) = (config.width, config.height);

    let mut bf = Battlefield::new(config, seed);
    bf.generate(Some(key)).map_err(|err| err.to_string())?;
    let mut store = MemorySlotStore::new();
    let mut last_round = 0;

    for _ in 0..steps {
        let step = choose(
            &mut rng,
            &[
                Step::Move,
                Step::Move,
                Step::Move,
                Step::Bomb,
                Step::Interact,
                Step::Auspex,
                Step::EndRound,
                Step::EndRound,
                Step::SaveLoad,
            ],
        );
        match step {
            Step::Move => {
                let roster = bf.roster();
                if roster.is_empty() {
                    continue;
                }
                let from = roster[below(&mut rng, roster.len())].pos;
                let to = Pos::new(
                    from.x + below(&mut rng, 5) as i32 - 2,
                    from.y + below(&mut rng, 5) as i32 - 2,
                );
                let units_before = roster.len();
                let outcome = bf.move_unit(from, to);
                let units_after = bf.roster().len();
                let expected = match outcome {
                    MoveOutcome::Moved { .. } | MoveOutcome::Rejected(_) => units_before,
                    MoveOutcome::LostInRiver { .. } | MoveOutcome::CapsizedOnDebris { .. } => {
                        units_before - 1
                    }
                };
                if units_after != expected {
                    return Err(format!("{outcome:?} left {units_after} units, expected {expected}"));
                }
            }
            Step::Bomb => {
                let action = choose(&mut rng, &["plantBomb", "disarmBomb", "rearmBomb"]);
                let count = bf.runtime().and_then(ScenarioRuntime::raid).map(|r| r.bombs.len());
                match (count, bf.invoke_action(action, below(&mut rng, 3))) {
                    (Some(count), Err(err)) if count > 2 => {
                        return Err(format!("valid bomb index rejected: {err}"));
                    }
                    (None, Ok(outcome)) => {
                        return Err(format!("{key} accepted a bomb action: {outcome:?}"));
                    }
                    _ => {}
                }
            }
            Step::Interact => {
                let roster = bf.roster();
                if roster.is_empty() {
                    continue;
                }
                let actor = roster[below(&mut rng, roster.len())].pos;
                let site = Pos::new(below(&mut rng, width) as i32, below(&mut rng, height) as i32);
                if let Err(err) = bf.interact_with_bomb(actor, site) {
                    return Err(format!("interaction raised {err}"));
                }
            }
            Step::Auspex => {
                bf.toggle_auspex();
            }
            Step::EndRound => {
                let report = bf.end_round();
                if report.round != last_round + 1 {
                    return Err(format!("round jumped from {last_round} to {}", report.round));
                }
                last_round = report.round;
                if report.resolved() && !matches!(bf.phase(), BattlePhase::Resolved { .. }) {
                    return Err("resolved round left the battle active".to_string());
                }
            }
            Step::SaveLoad => {
                let before = bf.snapshot_hash();
                bf.save_to(&mut store, "fuzz").map_err(|err| err.to_string())?;
                let loaded = bf.load_from(&store, "fuzz").map_err(|err| err.to_string())?;
                if !loaded || bf.snapshot_hash() != before {
                    return Err("save/load changed the battle".to_string());
                }
            }
        }
        check_invariants(&bf, width, height)?;
    }
    Ok(())
}

#[test]
fn fuzz_battles_keep_their_invariants() {
    let mut runner = TestRunner::new(ProptestConfig { cases: 64, ..ProptestConfig::default() });
    let result = runner.run(&(any::<u32>(), any::<u64>()), |(seed, choice_seed)| {
        run_fuzz_simulation(seed, choice_seed, 120).map_err(TestCaseError::fail)
    });
    if let Err(err) = result {
        panic!("{err}");
    }
}

#[test]
fn fixed_seed_fuzz_smoke() {
    for seed in 0..16 {
        run_fuzz_simulation(seed, u64::from(seed) * 7919, 200).expect("invariants hold");
    }
}
