//! Stable snapshot hashing for determinism checks. Covers everything a save
//! would carry except the transient visibility flags.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::Battlefield;
use crate::scenario::ScenarioRuntime;
use crate::state::Cell;
use crate::types::{BattlePhase, Orientation, Winner};

fn write_str(hasher: &mut Xxh3, value: &str) {
    hasher.write_u64(value.len() as u64);
    hasher.write(value.as_bytes());
}

fn write_opt_index(hasher: &mut Xxh3, index: Option<usize>) {
    match index {
        Some(index) => {
            hasher.write_u8(1);
            hasher.write_u64(index as u64);
        }
        None => hasher.write_u8(0),
    }
}

fn write_cell(hasher: &mut Xxh3, cell: &Cell) {
    hasher.write_u8(cell.kind as u8);
    hasher.write_u32(u32::from(cell.glyph));
    write_str(hasher, &cell.category);
    write_str(hasher, &cell.description);
    hasher.write_u8(match cell.faction {
        None => 0,
        Some(faction) => 1 + faction as u8,
    });
    let flags = [
        cell.priority,
        cell.prone,
        cell.on_platform,
        cell.is_bridge,
        cell.is_river,
        cell.is_debris,
        cell.overgrown,
    ];
    let bits = flags.iter().enumerate().fold(0u8, |acc, (i, &flag)| acc | (u8::from(flag) << i));
    hasher.write_u8(bits);
    write_opt_index(hasher, cell.bomb_index);
    write_opt_index(hasher, cell.casket_index);
}

fn write_runtime(hasher: &mut Xxh3, runtime: &ScenarioRuntime) {
    match runtime {
        ScenarioRuntime::Ambush { ambush } => {
            hasher.write_u8(0);
            hasher.write_u8(*ambush as u8);
        }
        ScenarioRuntime::Raid(state) => {
            hasher.write_u8(1);
            for bomb in &state.bombs {
                hasher.write_i32(bomb.x);
                hasher.write_i32(bomb.y);
                hasher.write_u8(u8::from(bomb.planted));
                hasher.write_u8(u8::from(bomb.armed));
                hasher.write_u32(bomb.counter);
                hasher.write_u8(u8::from(bomb.exploded));
            }
        }
        ScenarioRuntime::Conveyer(state) => {
            hasher.write_u8(2);
            let platform = &state.platform;
            hasher.write_i32(platform.center_x);
            hasher.write_i32(platform.center_y);
            hasher.write_i32(platform.radius);
            hasher.write_u32(platform.stationary_turns);
            hasher.write_u8(u8::from(platform.has_moved));
            for casket in &state.caskets {
                hasher.write_i32(casket.x);
                hasher.write_i32(casket.y);
                hasher.write_u8(u8::from(casket.on_platform));
                hasher.write_u8(u8::from(casket.recovered));
            }
        }
        ScenarioRuntime::Fungal(state) => {
            hasher.write_u8(3);
            for marker in &state.markers {
                hasher.write_i32(marker.x);
                hasher.write_i32(marker.y);
                hasher.write_i32(marker.radius);
            }
        }
        ScenarioRuntime::TollBridge(state) => {
            hasher.write_u8(4);
            hasher.write_i32(state.river_start);
            hasher.write_i32(state.river_end);
            hasher.write_u8(match state.bridge.orientation {
                Orientation::Horizontal => 0,
                Orientation::Vertical => 1,
            });
            for pos in &state.bridge.cells {
                hasher.write_i32(pos.x);
                hasher.write_i32(pos.y);
            }
        }
    }
}

impl Battlefield {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u32(self.rng.seed());
        hasher.write_u32(self.round);
        hasher.write_u8(u8::from(self.auspex_mode));
        hasher.write_u8(match &self.phase {
            BattlePhase::Setup => 0,
            BattlePhase::Active => 1,
            BattlePhase::Resolved { winner: Winner::Attacker, .. } => 2,
            BattlePhase::Resolved { winner: Winner::Defender, .. } => 3,
            BattlePhase::Resolved { winner: Winner::Draw, .. } => 4,
        });
        match self.scenario.as_ref().and_then(|scenario| scenario.key()) {
            Some(key) => write_str(&mut hasher, key.as_str()),
            None => hasher.write_u8(0),
        }
        hasher.write_u64(self.grid.width() as u64);
        hasher.write_u64(self.grid.height() as u64);
        for (_, cell) in self.grid.cells() {
            write_cell(&mut hasher, cell);
        }
        if let Some(runtime) = &self.runtime {
            write_runtime(&mut hasher, runtime);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::BattlefieldConfig;
    use crate::scenario::ScenarioKey;

    use super::*;

    #[test]
    fn hash_ignores_visibility_but_tracks_rounds() {
        let mut bf = Battlefield::new(BattlefieldConfig::default(), 12);
        bf.generate(Some(ScenarioKey::Conveyer)).expect("generate");
        let before = bf.snapshot_hash();

        bf.compute_visibility();
        assert_eq!(bf.snapshot_hash(), before);

        bf.end_round();
        assert_ne!(bf.snapshot_hash(), before);
    }
}
