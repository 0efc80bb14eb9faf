//! quakesim - synthetic earthquake monitoring pipeline.
//!
//! Generates noisy three-station ground motion for a known source, picks P
//! and S arrivals from detection-probability signals as samples stream in,
//! then inverts the P picks for an epicenter by grid search and estimates a
//! local magnitude. A display layer drives [`scheduler::Scheduler`] one tick
//! at a time and reads snapshots; it never touches run state directly.

pub mod associate;
pub mod config;
pub mod errors;
pub mod geo;
pub mod locate;
pub mod magnitude;
pub mod models;
pub mod output;
pub mod picker;
pub mod ring;
pub mod scheduler;
pub mod signal;
pub mod station;
pub mod synth;

pub use config::SimConfig;
pub use errors::{LocateError, SimError};
pub use models::{Phase, Solution, SourceEvent, Station, VelocityModel};
pub use scheduler::{RunEvent, RunOutcome, RunSnapshot, Scheduler};
