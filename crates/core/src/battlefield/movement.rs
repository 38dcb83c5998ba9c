use tracing::debug;

use super::Battlefield;
use crate::log::BattleEvent;
use crate::outcome::{MoveOutcome, Rejection};
use crate::state::Cell;
use crate::types::{CellKind, Pos};

/// Floor, rubble and river water accept a moving unit; everything else
/// blocks it.
fn accepts_unit(cell: &Cell) -> bool {
    match cell.kind {
        CellKind::Floor | CellKind::Rubble => true,
        CellKind::Hazard => cell.is_river,
        _ => false,
    }
}

impl Battlefield {
    /// Moves the unit at `from` to `to`. The vacated cell reverts to the
    /// terrain the unit stood on. Plain river water claims the unit outright;
    /// floating debris capsizes on a 1.
    pub fn move_unit(&mut self, from: Pos, to: Pos) -> MoveOutcome {
        match self.try_move(from, to) {
            Ok(outcome) => {
                self.refresh_visibility();
                outcome
            }
            Err(rejection) => {
                debug!(target: "auspex::battlefield", %from, %to, %rejection, "move rejected");
                self.log.push(BattleEvent::Rejected(rejection.clone()));
                MoveOutcome::Rejected(rejection)
            }
        }
    }

    fn try_move(&mut self, from: Pos, to: Pos) -> Result<MoveOutcome, Rejection> {
        for pos in [from, to] {
            if !self.grid.in_bounds(pos) {
                return Err(Rejection::OutOfBounds(pos));
            }
        }
        let unit = self
            .grid
            .get(from)
            .filter(|cell| cell.is_unit())
            .cloned()
            .ok_or(Rejection::NoUnitAt(from))?;
        let target = self.grid.get(to).cloned().ok_or(Rejection::OutOfBounds(to))?;
        if !accepts_unit(&target) {
            return Err(Rejection::Blocked { pos: to, kind: target.kind });
        }

        self.grid.set(from, unit.terrain_beneath());

        if target.is_river && !target.is_bridge && !target.is_debris {
            self.log.push(BattleEvent::UnitLostInRiver { at: to });
            return Ok(MoveOutcome::LostInRiver { at: to });
        }
        if target.is_debris {
            self.log.push(BattleEvent::DebrisLeap { at: to });
            if self.rng.roll_d6() == 1 {
                self.log.push(BattleEvent::DebrisCapsized { at: to });
                return Ok(MoveOutcome::CapsizedOnDebris { at: to });
            }
        }

        let mut moved = unit;
        moved.copy_standing_flags(&target);
        self.grid.set(to, moved);
        self.log.push(BattleEvent::UnitMoved { to });
        Ok(MoveOutcome::Moved { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattlefieldConfig;
    use crate::state::Grid;
    use crate::types::Faction;

    fn open_field() -> Battlefield {
        let mut bf = Battlefield::new(BattlefieldConfig::default(), 1);
        bf.grid = Grid::filled(50, 25, Cell::open_ground());
        bf
    }

    fn drop_unit(bf: &mut Battlefield, pos: Pos) {
        let beneath = bf.grid.get(pos).cloned().expect("in bounds");
        bf.grid.set(pos, Cell::unit_on(Faction::Attacker, "Marauder", &beneath));
    }

    #[test]
    fn moving_onto_floor_leaves_terrain_behind() {
        let mut bf = open_field();
        drop_unit(&mut bf, Pos::new(3, 3));
        assert_eq!(
            bf.move_unit(Pos::new(3, 3), Pos::new(4, 3)),
            MoveOutcome::Moved { from: Pos::new(3, 3), to: Pos::new(4, 3) }
        );
        assert_eq!(bf.grid.kind_at(Pos::new(3, 3)), Some(CellKind::Floor));
        assert!(bf.grid.get(Pos::new(4, 3)).is_some_and(|c| c.is_faction(Faction::Attacker)));
    }

    #[test]
    fn invalid_moves_are_rejected_without_side_effects() {
        let mut bf = open_field();
        drop_unit(&mut bf, Pos::new(3, 3));
        bf.grid.set(Pos::new(4, 3), Cell::wall("Bulkhead"));
        let before = bf.grid.clone();

        let blocked = bf.move_unit(Pos::new(3, 3), Pos::new(4, 3));
        assert_eq!(
            blocked,
            MoveOutcome::Rejected(Rejection::Blocked { pos: Pos::new(4, 3), kind: CellKind::Wall })
        );
        assert_eq!(
            bf.move_unit(Pos::new(9, 9), Pos::new(9, 10)),
            MoveOutcome::Rejected(Rejection::NoUnitAt(Pos::new(9, 9)))
        );
        assert_eq!(
            bf.move_unit(Pos::new(3, 3), Pos::new(-1, 3)),
            MoveOutcome::Rejected(Rejection::OutOfBounds(Pos::new(-1, 3)))
        );
        assert_eq!(bf.grid, before);
    }

    #[test]
    fn unit_entering_the_river_is_lost_and_the_river_remains() {
        let mut bf = open_field();
        let bank = Pos::new(21, 2);
        bf.grid.set(bank, Cell::open_ground());
        drop_unit(&mut bf, bank);
        let water = Pos::new(22, 2);
        bf.grid.set(water, Cell::river("Toxic River"));

        let outcome = bf.move_unit(bank, water);
        assert_eq!(outcome, MoveOutcome::LostInRiver { at: water });
        assert!(outcome.unit_lost());
        let left = bf.grid.get(water).expect("in bounds");
        assert_eq!(left.kind, CellKind::Hazard);
        assert!(left.is_river && !left.is_unit());
        assert_eq!(bf.grid.kind_at(bank), Some(CellKind::Floor));
    }

    fn visible_cells(bf: &Battlefield) -> Vec<Pos> {
        bf.grid.cells().filter(|(_, cell)| cell.visible).map(|(pos, _)| pos).collect()
    }

    #[test]
    fn losing_a_unit_to_the_river_refreshes_auspex() {
        let mut bf = open_field();
        let bank = Pos::new(3, 3);
        drop_unit(&mut bf, bank);
        drop_unit(&mut bf, Pos::new(45, 20));
        let water = Pos::new(4, 3);
        bf.grid.set(water, Cell::river("Toxic River"));
        bf.toggle_auspex();
        assert!(bf.grid.get(Pos::new(1, 1)).is_some_and(|c| c.visible));

        assert_eq!(bf.move_unit(bank, water), MoveOutcome::LostInRiver { at: water });
        let after_move = visible_cells(&bf);
        bf.compute_visibility();
        assert_eq!(after_move, visible_cells(&bf));
        assert!(bf.grid.get(Pos::new(1, 1)).is_some_and(|c| !c.visible));
    }

    #[test]
    fn debris_either_holds_the_unit_or_capsizes() {
        let mut outcomes = (0, 0);
        for seed in 0..120 {
            let mut bf = Battlefield::new(BattlefieldConfig::default(), seed);
            bf.grid = Grid::filled(50, 25, Cell::open_ground());
            drop_unit(&mut bf, Pos::new(10, 10));
            bf.grid.set(Pos::new(11, 10), Cell::debris());
            match bf.move_unit(Pos::new(10, 10), Pos::new(11, 10)) {
                MoveOutcome::Moved { to, .. } => {
                    let cell = bf.grid.get(to).expect("in bounds");
                    assert!(cell.is_unit() && cell.is_debris && cell.is_river);
                    outcomes.0 += 1;
                }
                MoveOutcome::CapsizedOnDebris { at } => {
                    assert!(bf.grid.get(at).is_some_and(|c| !c.is_unit() && c.is_debris));
                    outcomes.1 += 1;
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        assert!(outcomes.0 > 0 && outcomes.1 > 0, "{outcomes:?}");
    }
}
