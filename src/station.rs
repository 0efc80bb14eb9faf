//! Per-station mutable state for one run.

use serde::Serialize;

use crate::ring::SampleRing;
use crate::synth::TraceSample;

/// Windowed buffers, peak tracking, and pick state of one station.
#[derive(Debug, Clone)]
pub struct StationRun {
    /// Station code, copied from the configuration
    pub code: String,
    pub amplitude: SampleRing,
    pub p_prob: SampleRing,
    pub s_prob: SampleRing,
    /// Largest absolute amplitude seen so far
    pub peak_amplitude: f64,
    /// Absolute tick of the P pick
    pub p_pick: Option<u64>,
    /// Absolute tick of the S pick
    pub s_pick: Option<u64>,
    /// Waveform has shown P energy (display cue only)
    pub fired: bool,
    /// A P pick exists; picking for this station is finished
    pub picked: bool,
}

impl StationRun {
    /// Fresh state: zero-filled buffers, no picks, flags cleared.
    #[must_use]
    pub fn new(code: impl Into<String>, window: usize) -> Self {
        Self {
            code: code.into(),
            amplitude: SampleRing::new(window),
            p_prob: SampleRing::new(window),
            s_prob: SampleRing::new(window),
            peak_amplitude: 0.0,
            p_pick: None,
            s_pick: None,
            fired: false,
            picked: false,
        }
    }

    /// Append one generated sample to every buffer and update peak tracking.
    pub fn ingest(&mut self, sample: TraceSample) {
        self.amplitude.push(sample.amplitude);
        self.p_prob.push(sample.p_prob);
        self.s_prob.push(sample.s_prob);
        self.peak_amplitude = self.peak_amplitude.max(sample.amplitude.abs());
        self.fired |= sample.p_arrived;
    }

    /// Read-only copy for the display layer.
    #[must_use]
    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            code: self.code.clone(),
            amplitude: self.amplitude.to_vec(),
            p_prob: self.p_prob.to_vec(),
            s_prob: self.s_prob.to_vec(),
            peak_amplitude: self.peak_amplitude,
            p_pick: self.p_pick,
            s_pick: self.s_pick,
            fired: self.fired,
            picked: self.picked,
        }
    }
}

/// Owned snapshot of a station, buffers ordered oldest to newest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSnapshot {
    pub code: String,
    pub amplitude: Vec<f64>,
    pub p_prob: Vec<f64>,
    pub s_prob: Vec<f64>,
    pub peak_amplitude: f64,
    pub p_pick: Option<u64>,
    pub s_pick: Option<u64>,
    pub fired: bool,
    pub picked: bool,
}
