use tracing::{debug, info};

use super::{Battlefield, scenario_ctx};
use crate::log::BattleEvent;
use crate::outcome::{Rejection, RoundOutcome, RoundReport};
use crate::types::{BattlePhase, VictoryCheck};

impl Battlefield {
    /// Advances one round: scenario end phase, reinforcements, then the
    /// victory check. Once resolved, further rounds are refused only when
    /// `enforce_resolution` is set.
    pub fn end_round(&mut self) -> RoundReport {
        if self.config.enforce_resolution && matches!(self.phase, BattlePhase::Resolved { .. }) {
            debug!(target: "auspex::battlefield", round = self.round, "round refused");
            self.log.push(BattleEvent::Rejected(Rejection::BattleResolved));
            return RoundReport {
                round: self.round,
                outcome: RoundOutcome::Refused(Rejection::BattleResolved),
            };
        }

        self.round += 1;
        if let (Some(scenario), Some(runtime)) = (self.scenario.as_ref(), self.runtime.as_mut()) {
            let mut ctx =
                scenario_ctx(&mut self.grid, &mut self.rng, &mut self.log, self.round, &self.config);
            runtime.end_phase(&mut ctx, scenario);
            let arrived = runtime.reinforce(&mut ctx, scenario);
            if arrived > 0 {
                debug!(target: "auspex::battlefield", arrived, "reinforcements placed");
            }
        }
        self.log.push(BattleEvent::RoundEnded { round: self.round });

        let outcome = match self.evaluate_victory() {
            VictoryCheck::Continue => RoundOutcome::Continue,
            ended => RoundOutcome::Resolved(ended),
        };
        self.refresh_visibility();
        info!(target: "auspex::battlefield", round = self.round, ?outcome, "round ended");
        RoundReport { round: self.round, outcome }
    }
}
