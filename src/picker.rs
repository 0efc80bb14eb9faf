//! Threshold-crossing phase picker.
//!
//! A pick is the first tick at which the newest detection probability is at
//! or above the threshold. Picks are absolute ticks and never move once set.

use tracing::debug;

use crate::models::Phase;
use crate::station::StationRun;

/// Thresholds applied to the P and S probability signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub p: f64,
    pub s: f64,
}

/// Evaluate the newest probabilities of `run` at `tick`.
///
/// Returns the phases picked by this call. Past ticks are never
/// re-evaluated, so a threshold lowered mid-run only affects future ticks.
pub fn update_pick(run: &mut StationRun, tick: u64, thresholds: Thresholds) -> Vec<Phase> {
    let mut picked = Vec::new();

    if run.p_pick.is_none() && run.p_prob.latest() >= thresholds.p {
        run.p_pick = Some(tick);
        run.picked = true;
        debug!(station = %run.code, tick, "P pick");
        picked.push(Phase::P);
    }

    if run.s_pick.is_none() && run.s_prob.latest() >= thresholds.s {
        run.s_pick = Some(tick);
        debug!(station = %run.code, tick, "S pick");
        picked.push(Phase::S);
    }

    picked
}
