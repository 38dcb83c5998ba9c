use auspex_core::scenario::Behaviour;
use auspex_core::{
    BattleEvent, Battlefield, BattlefieldConfig, BattlePhase, CellKind, Faction, RoundOutcome,
    ScenarioError, ScenarioKey, ScenarioRuntime,
};

fn generated(key: ScenarioKey, seed: u32) -> Battlefield {
    let mut bf = Battlefield::new(BattlefieldConfig::default(), seed);
    bf.generate(Some(key)).expect("generate");
    bf
}

#[test]
fn every_registered_scenario_is_complete() {
    for key in ScenarioKey::ALL {
        let scenario = key.definition().validate().expect("builtin scenarios validate");
        assert!(!scenario.name.is_empty(), "{key} has no name");
        assert!(!scenario.definition.description.is_empty(), "{key} has no description");
        assert_eq!(scenario.key(), Some(key));
        assert_eq!(key.as_str().parse::<ScenarioKey>(), Ok(key));
    }
}

#[test]
fn every_scenario_sets_up_and_reports_a_structured_round() {
    for key in ScenarioKey::ALL {
        let mut bf = generated(key, 5);
        assert_eq!(bf.phase(), &BattlePhase::Active, "{key}");
        assert!(bf.grid().count_units(Faction::Attacker) > 0, "{key} deployed no attackers");
        assert!(bf.grid().count_units(Faction::Defender) > 0, "{key} deployed no defenders");

        let report = bf.end_round();
        assert_eq!(report.round, 1);
        match report.outcome {
            RoundOutcome::Continue => assert!(!report.resolved()),
            RoundOutcome::Resolved(check) => {
                assert!(check.ended());
                assert!(check.winner().is_some());
            }
            RoundOutcome::Refused(rejection) => panic!("{key} refused its first round: {rejection}"),
        }
    }
}

#[test]
fn runtime_matches_scenario_behaviour() {
    for key in ScenarioKey::ALL {
        let bf = generated(key, 9);
        let runtime = bf.runtime().expect("runtime bound");
        let behaviour = bf.scenario().map(|s| s.behaviour()).expect("scenario bound");
        assert!(runtime.fits(bf.scenario().expect("scenario bound")));
        let consistent = match behaviour {
            Behaviour::Ambush(kind) => *runtime == ScenarioRuntime::Ambush { ambush: kind },
            Behaviour::ManufactorumRaid => runtime.raid().is_some(),
            Behaviour::Conveyer => runtime.conveyer().is_some(),
            Behaviour::FungalHorror => runtime.fungal().is_some(),
            Behaviour::TollBridge => runtime.toll_bridge().is_some(),
        };
        assert!(consistent, "{key} bound the wrong runtime");
        for other in ScenarioKey::ALL.into_iter().filter(|other| *other != key) {
            let other = generated(other, 9);
            let other_scenario = other.scenario().expect("scenario bound");
            if other_scenario.behaviour() != behaviour {
                assert!(!runtime.fits(other_scenario), "{key} runtime fits {}", other_scenario.name);
            }
        }
    }
}

#[test]
fn incomplete_definitions_fail_closed() {
    let mut bf = Battlefield::new(BattlefieldConfig::default(), 1);
    let mut definition = ScenarioKey::TollBridge.definition();
    definition.name = None;
    definition.defender = None;

    let err = bf.generate_with_definition(definition).expect_err("incomplete");
    assert_eq!(err, ScenarioError::MissingFields(vec!["name", "defender"]));
    assert!(bf.scenario().is_none());
    assert!(bf.runtime().is_none());
    assert_eq!(bf.roster().len(), 0);
    assert_eq!(err.to_string(), "invalid scenario: missing properties [name, defender]");
}

#[test]
fn manufactorum_raid_places_three_spaced_bombs() {
    let baseline = 25 - 4;
    for seed in 0..20 {
        let bf = generated(ScenarioKey::ManufactorumRaid, seed);
        assert_eq!((bf.grid().width(), bf.grid().height()), (50, 25));

        let markers: Vec<_> = bf
            .grid()
            .cells()
            .filter(|(_, cell)| cell.kind == CellKind::Objective && cell.bomb_index.is_some())
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(markers.len(), 3, "seed {seed}");

        for (i, a) in markers.iter().enumerate() {
            assert!((a.y - baseline).abs() >= 8, "seed {seed}: bomb too close to the baseline");
            for b in &markers[i + 1..] {
                assert!(a.distance(*b) >= 12.0, "seed {seed}: bombs {a} and {b} too close");
            }
        }
        assert!(bf.log().events().contains(&BattleEvent::BombSitesMarked { count: 3 }));
    }
}
