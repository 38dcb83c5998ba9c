use auspex_core::{
    BattleEvent, Battlefield, BattlefieldConfig, BattlePhase, CellKind, Faction, MoveOutcome, Pos,
    ScenarioKey, ScenarioRuntime, Winner,
};

fn generated(key: ScenarioKey, seed: u32) -> Battlefield {
    let mut bf = Battlefield::new(BattlefieldConfig::default(), seed);
    bf.generate(Some(key)).expect("generate");
    bf
}

#[test]
fn planted_bombs_all_detonate_and_hand_the_raid_to_the_attacker() {
    for seed in [4, 40, 400] {
        let mut bf = generated(ScenarioKey::ManufactorumRaid, seed);
        let count = bf.runtime().and_then(ScenarioRuntime::raid).expect("raid").bombs.len();
        for index in 0..count {
            assert!(bf.invoke_action("plantBomb", index).expect("plant").succeeded());
        }
        for _ in 0..6 {
            bf.end_round();
        }

        let raid = bf.runtime().and_then(ScenarioRuntime::raid).expect("raid");
        assert_eq!(raid.exploded_count(), count, "seed {seed}");
        let detonations = bf
            .log()
            .events()
            .iter()
            .filter(|event| matches!(event, BattleEvent::BombDetonated { .. }))
            .count();
        assert_eq!(detonations, count, "detonation must happen once per bomb");
        assert!(matches!(bf.phase(), BattlePhase::Resolved { winner: Winner::Attacker, .. }));
        assert!(bf.status_message().starts_with("ALL BOMBS DETONATED"));
    }
}

#[test]
fn stepping_into_the_toxic_river_loses_the_unit() {
    let mut bf = generated(ScenarioKey::TollBridge, 13);
    let river = bf
        .grid()
        .cells()
        .find(|(_, cell)| {
            cell.kind == CellKind::Hazard && cell.is_river && !cell.is_bridge && !cell.is_debris
        })
        .map(|(pos, _)| pos)
        .expect("open river");
    let river_glyph = bf.grid().get(river).map(|cell| cell.glyph).expect("cell");
    let unit = bf.roster()[0].pos;
    let before = bf.roster().len();

    assert_eq!(bf.move_unit(unit, river), MoveOutcome::LostInRiver { at: river });

    let cell = bf.grid().get(river).expect("cell");
    assert_eq!(cell.kind, CellKind::Hazard);
    assert!(cell.is_river);
    assert_eq!(cell.glyph, river_glyph);
    assert_eq!(bf.roster().len(), before - 1);
    assert!(!bf.grid().get(unit).is_some_and(|cell| cell.is_unit()));
}

#[test]
fn the_bridge_only_pivots_from_round_three_and_stays_bridged() {
    for seed in 0..15 {
        let mut bf = generated(ScenarioKey::TollBridge, seed);
        for _ in 0..8 {
            let mark = bf.log().len();
            let report = bf.end_round();
            let pivoted = bf
                .log()
                .since(mark)
                .iter()
                .any(|event| matches!(event, BattleEvent::BridgePivoting { .. }));
            if report.round < 3 {
                assert!(!pivoted, "seed {seed}: pivot in round {}", report.round);
            }

            let bridge = &bf.runtime().and_then(ScenarioRuntime::toll_bridge).expect("bridge").bridge;
            for pos in &bridge.cells {
                assert!(
                    bf.grid().get(*pos).is_some_and(|cell| cell.is_bridge),
                    "seed {seed}: {pos} lost its bridge flag"
                );
            }
        }
    }
}

#[test]
fn conveyer_descent_resets_the_bonus_and_secures_caskets() {
    let mut descents = 0;
    for seed in 0..10 {
        let mut bf = generated(ScenarioKey::Conveyer, seed);
        let mut secured = 0;
        for _ in 0..8 {
            let mark = bf.log().len();
            bf.end_round();
            let state = bf.runtime().and_then(ScenarioRuntime::conveyer).expect("conveyer");
            assert!(state.secured_caskets() >= secured, "secured caskets never return");
            secured = state.secured_caskets();

            let descended =
                bf.log().since(mark).iter().any(|e| matches!(e, BattleEvent::PlatformDescending));
            if descended {
                descents += 1;
                assert_eq!(state.platform.stationary_turns, 0);
                assert!(state.platform.has_moved);
                for unit in bf.roster().iter().filter(|u| u.faction == Faction::Defender) {
                    assert!(unit.on_platform, "seed {seed}: defender left behind");
                }
            }
        }
    }
    assert!(descents > 0, "ten battles of eight rounds should see a descent");
}

#[test]
fn conveyer_defenders_hold_out_until_round_nine() {
    let mut bf = generated(ScenarioKey::Conveyer, 21);
    for round in 1..=9 {
        let report = bf.end_round();
        assert_eq!(report.resolved(), round == 9, "round {round}");
    }
    match bf.phase() {
        BattlePhase::Resolved { winner, message } => {
            assert_eq!(*winner, Winner::Defender);
            assert!(message.contains("Loot caskets secured"));
        }
        other => panic!("expected a resolved battle, got {other:?}"),
    }
}

#[test]
fn fungal_growth_respects_its_cap_and_never_recedes() {
    for seed in 0..8 {
        let mut bf = generated(ScenarioKey::FungalHorror, seed);
        let mut overgrown = bf.grid().cells().filter(|(_, c)| c.overgrown).count();
        assert!(overgrown > 0);
        for _ in 0..15 {
            bf.end_round();
            let markers = bf.runtime().and_then(ScenarioRuntime::fungal).expect("fungal").markers.len();
            assert!(markers <= 9, "seed {seed}: {markers} markers");

            let now = bf.grid().cells().filter(|(_, c)| c.overgrown).count();
            assert!(now >= overgrown, "seed {seed}: overgrowth receded");
            overgrown = now;
        }
    }
}

#[test]
fn visibility_from_a_unit_includes_its_own_cell() {
    let bf = generated(ScenarioKey::Bushwhack, 2);
    for unit in bf.roster() {
        assert!(bf.unit_visibility(unit.pos).contains(&unit.pos));
    }
    let corner = Pos::new(0, 0);
    assert!(bf.unit_visibility(corner).contains(&corner));
}
