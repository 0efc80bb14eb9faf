//! Streaming scheduler.
//!
//! Advances simulated time one tick at a time. Each tick reveals one new
//! sample per station, updates picks, and checks the completion and timeout
//! conditions. When picking has completed and the settle period has passed,
//! the association gate, location solver, and magnitude estimator run once
//! against the frozen station state.
//!
//! The scheduler owns the [`Run`]; the display layer only reads owned
//! [`RunSnapshot`]s and the [`RunEvent`]s returned from [`Scheduler::tick`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::associate::usable;
use crate::config::SimConfig;
use crate::errors::{LocateError, SimError};
use crate::locate::{Observation, solve};
use crate::magnitude;
use crate::models::{Phase, Solution};
use crate::picker::{Thresholds, update_pick};
use crate::station::{StationRun, StationSnapshot};
use crate::synth::TraceGenerator;

/// Lifecycle signal emitted by a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started,
    StationPicked {
        station: String,
        phase: Phase,
        tick: u64,
    },
    PickingComplete {
        tick: u64,
    },
    Solved {
        solution: Solution,
    },
    Failed {
        reason: LocateError,
    },
    Timeout {
        tick: u64,
    },
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Solved { solution: Solution },
    Failed { reason: LocateError },
    TimedOut { tick: u64 },
    Aborted { tick: u64 },
}

impl RunOutcome {
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Solved { solution } => Some(solution),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }
}

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// Created, no tick processed yet
    Pending,
    /// Waiting for every station to carry a P pick
    Streaming,
    /// All P picks in; letting the display settle before solving
    Settling { complete_at: u64 },
    Finished(RunOutcome),
}

/// Coarse status label for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Streaming,
    Settling,
    Solved,
    Failed,
    TimedOut,
    Aborted,
}

impl RunState {
    #[must_use]
    pub fn status(&self) -> RunStatus {
        match self {
            Self::Pending => RunStatus::Pending,
            Self::Streaming => RunStatus::Streaming,
            Self::Settling { .. } => RunStatus::Settling,
            Self::Finished(RunOutcome::Solved { .. }) => RunStatus::Solved,
            Self::Finished(RunOutcome::Failed { .. }) => RunStatus::Failed,
            Self::Finished(RunOutcome::TimedOut { .. }) => RunStatus::TimedOut,
            Self::Finished(RunOutcome::Aborted { .. }) => RunStatus::Aborted,
        }
    }
}

/// All mutable state of one simulation run.
#[derive(Debug, Clone)]
pub struct Run {
    /// Ticks processed so far; also the index of the next tick
    pub tick: u64,
    pub stations: Vec<StationRun>,
    pub state: RunState,
}

impl Run {
    fn new(config: &SimConfig) -> Self {
        Self {
            tick: 0,
            stations: config
                .stations
                .iter()
                .map(|sta| StationRun::new(sta.code.clone(), config.window))
                .collect(),
            state: RunState::Pending,
        }
    }

    fn picking_complete(&self) -> bool {
        self.stations.iter().all(|s| s.picked)
    }
}

/// Read-only view of a run for the display layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub tick: u64,
    pub status: RunStatus,
    pub p_threshold: f64,
    pub s_threshold: f64,
    pub stations: Vec<StationSnapshot>,
}

/// Tick driver. Owns the configuration, the generator, the RNG, and the run.
#[derive(Debug)]
pub struct Scheduler<R = StdRng> {
    config: SimConfig,
    generator: TraceGenerator,
    thresholds: Thresholds,
    rng: R,
    run: Run,
}

impl<R: Rng + SeedableRng> Scheduler<R> {
    /// Build a scheduler with an RNG seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let generator = TraceGenerator::new(
            &config.stations,
            config.source,
            config.velocity,
            config.dt,
            config.noise_sigma,
            config.prob_sigma,
        );
        let thresholds = Thresholds {
            p: config.p_threshold,
            s: config.s_threshold,
        };
        let rng = R::seed_from_u64(config.seed);
        let run = Run::new(&config);

        Ok(Self {
            config,
            generator,
            thresholds,
            rng,
            run,
        })
    }

    /// Discard all run state and start over from tick zero.
    ///
    /// Thresholds return to their configured values and the RNG is reseeded,
    /// so a restarted run replays the previous one exactly.
    pub fn restart(&mut self) {
        info!("restarting run");
        self.rng = R::seed_from_u64(self.config.seed);
        self.thresholds = Thresholds {
            p: self.config.p_threshold,
            s: self.config.s_threshold,
        };
        self.run = Run::new(&self.config);
    }
}

impl<R: Rng> Scheduler<R> {
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn generator(&self) -> &TraceGenerator {
        &self.generator
    }

    #[must_use]
    pub fn run(&self) -> &Run {
        &self.run
    }

    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Ticks processed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.run.tick
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.run.state, RunState::Finished(_))
    }

    #[must_use]
    pub fn outcome(&self) -> Option<&RunOutcome> {
        match &self.run.state {
            RunState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Change pick thresholds. Only ticks processed after the call see them.
    pub fn set_thresholds(&mut self, p: f64, s: f64) {
        debug!(p, s, tick = self.run.tick, "thresholds changed");
        self.thresholds = Thresholds { p, s };
    }

    /// Stop the run. Returns `false` if it had already finished.
    pub fn abort(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        warn!(tick = self.run.tick, "run aborted");
        self.run.state = RunState::Finished(RunOutcome::Aborted {
            tick: self.run.tick,
        });
        true
    }

    /// Owned copy of the current run state.
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            tick: self.run.tick,
            status: self.run.state.status(),
            p_threshold: self.thresholds.p,
            s_threshold: self.thresholds.s,
            stations: self.run.stations.iter().map(StationRun::snapshot).collect(),
        }
    }

    /// Process one tick and return the lifecycle signals it produced.
    ///
    /// A finished run processes nothing and returns no signals.
    pub fn tick(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();

        match self.run.state {
            RunState::Finished(_) => return events,
            RunState::Pending => {
                info!(
                    stations = self.run.stations.len(),
                    dt = self.config.dt,
                    "run started"
                );
                self.run.state = RunState::Streaming;
                events.push(RunEvent::Started);
            }
            RunState::Streaming | RunState::Settling { .. } => {}
        }

        let k = self.run.tick;
        for (index, station) in self.run.stations.iter_mut().enumerate() {
            let sample = self.generator.sample(index, k, &mut self.rng);
            station.ingest(sample);

            for phase in update_pick(station, k, self.thresholds) {
                if phase == Phase::P {
                    info!(station = %station.code, tick = k, "station picked");
                }
                events.push(RunEvent::StationPicked {
                    station: station.code.clone(),
                    phase,
                    tick: k,
                });
            }
        }
        self.run.tick += 1;

        if self.run.state == RunState::Streaming && self.run.picking_complete() {
            info!(tick = k, "picking complete");
            self.run.state = RunState::Settling { complete_at: k };
            events.push(RunEvent::PickingComplete { tick: k });
        }

        match self.run.state {
            RunState::Settling { complete_at } if k - complete_at >= self.config.settle_ticks => {
                let outcome = match self.finish() {
                    Ok(solution) => {
                        events.push(RunEvent::Solved {
                            solution: solution.clone(),
                        });
                        RunOutcome::Solved { solution }
                    }
                    Err(reason) => {
                        events.push(RunEvent::Failed { reason });
                        RunOutcome::Failed { reason }
                    }
                };
                self.run.state = RunState::Finished(outcome);
            }
            RunState::Streaming if self.run.tick >= self.config.max_ticks => {
                let tick = self.run.tick;
                warn!(tick, "tick ceiling reached before picking completed");
                self.run.state = RunState::Finished(RunOutcome::TimedOut { tick });
                events.push(RunEvent::Timeout { tick });
            }
            _ => {}
        }

        events
    }

    /// Tick until the run finishes, returning every signal emitted.
    pub fn run_to_end(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while !self.is_finished() {
            events.extend(self.tick());
        }
        events
    }

    /// Association, location, and magnitude over the frozen station state.
    #[allow(clippy::cast_precision_loss)]
    fn finish(&self) -> Result<Solution, LocateError> {
        let observations: Vec<Observation> = self
            .run
            .stations
            .iter()
            .zip(&self.config.stations)
            .filter(|(run, _)| usable(run))
            .filter_map(|(run, sta)| {
                run.p_pick.map(|tick| Observation {
                    code: sta.code.clone(),
                    latitude: sta.latitude,
                    longitude: sta.longitude,
                    p_time: tick as f64 * self.config.dt,
                    peak_amplitude: run.peak_amplitude,
                })
            })
            .collect();

        debug!(usable = observations.len(), "association gate evaluated");

        let location = solve(
            &observations,
            self.config.velocity.vp,
            &self.config.search_box,
            self.config.grid_step,
        )
        .inspect_err(|reason| warn!("location failed: {reason}"))?;

        let magnitude = magnitude::estimate(&observations, location.latitude, location.longitude);
        let solution = Solution {
            latitude: location.latitude,
            longitude: location.longitude,
            origin_time: location.origin_time,
            misfit: location.misfit,
            magnitude,
            stations_used: observations.len(),
        };
        info!(
            latitude = solution.latitude,
            longitude = solution.longitude,
            origin_time = solution.origin_time,
            misfit = solution.misfit,
            magnitude = ?solution.magnitude,
            "event located"
        );
        Ok(solution)
    }
}
