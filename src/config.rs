//! Simulation configuration.
//!
//! `SimConfig` is the whole configuration surface of a run. Defaults
//! describe a three-station network in Taiwan with a shallow source
//! between Hualien and Taichung. A JSON file may override any field.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::SimError;
use crate::geo::SearchBox;
use crate::models::{SourceEvent, Station, VelocityModel};

/// Default simulated seconds per tick.
pub const DEFAULT_DT: f64 = 0.05;

/// Default window length (samples kept per station).
pub const DEFAULT_WINDOW: usize = 200;

/// Full configuration of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Recording stations
    pub stations: Vec<Station>,
    /// Wave speeds
    pub velocity: VelocityModel,
    /// Ground-truth event synthesized by the generator
    pub source: SourceEvent,
    /// Simulated seconds per tick
    pub dt: f64,
    /// P detection threshold on the probability signal
    pub p_threshold: f64,
    /// S detection threshold on the probability signal
    pub s_threshold: f64,
    /// Standard deviation of background amplitude noise
    pub noise_sigma: f64,
    /// Standard deviation of jitter added to detection probabilities
    pub prob_sigma: f64,
    /// Grid search bounds
    pub search_box: SearchBox,
    /// Grid search step in degrees
    pub grid_step: f64,
    /// Samples kept per station buffer
    pub window: usize,
    /// Ticks to keep streaming after the last P pick
    pub settle_ticks: u64,
    /// Hard tick ceiling before the run times out
    pub max_ticks: u64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stations: vec![
                Station::new("HUAL", 23.9769, 121.6044),
                Station::new("TCU", 24.1477, 120.6736),
                Station::new("KAU", 22.6273, 120.3014),
            ],
            velocity: VelocityModel::default(),
            source: SourceEvent {
                latitude: 23.84,
                longitude: 121.24,
                origin_tick: 20,
            },
            dt: DEFAULT_DT,
            p_threshold: 0.5,
            s_threshold: 0.5,
            noise_sigma: 0.05,
            prob_sigma: 0.02,
            search_box: SearchBox {
                min_lat: 21.8,
                min_lon: 119.9,
                max_lat: 25.4,
                max_lon: 122.1,
            },
            grid_step: 0.02,
            window: DEFAULT_WINDOW,
            settle_ticks: 40,
            max_ticks: 2400,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a configuration from JSON text. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails validation.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Same configuration with both noise terms switched off.
    #[must_use]
    pub fn noiseless(mut self) -> Self {
        self.noise_sigma = 0.0;
        self.prob_sigma = 0.0;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.stations.is_empty() {
            return Err(SimError::Config("station list is empty".into()));
        }
        for sta in &self.stations {
            if sta.code.is_empty() {
                return Err(SimError::Config("station with empty code".into()));
            }
            if !(-90.0..=90.0).contains(&sta.latitude) || !(-180.0..=180.0).contains(&sta.longitude)
            {
                return Err(SimError::Config(format!(
                    "station {} has out-of-range coordinates ({}, {})",
                    sta.code, sta.latitude, sta.longitude
                )));
            }
        }
        let VelocityModel { vp, vs } = self.velocity;
        if !(vs > 0.0 && vp > vs) {
            return Err(SimError::Config(format!(
                "velocity model requires vp > vs > 0, got vp={vp} vs={vs}"
            )));
        }
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(SimError::Config(format!("dt must be positive, got {}", self.dt)));
        }
        if self.noise_sigma < 0.0 || self.prob_sigma < 0.0 {
            return Err(SimError::Config("noise sigmas must be non-negative".into()));
        }
        if self.window == 0 {
            return Err(SimError::Config("window must hold at least one sample".into()));
        }
        if self.max_ticks == 0 {
            return Err(SimError::Config("max_ticks must be positive".into()));
        }
        if self.settle_ticks >= self.max_ticks {
            return Err(SimError::Config(format!(
                "settle_ticks {} must be below max_ticks {}",
                self.settle_ticks, self.max_ticks
            )));
        }
        if !(self.grid_step > 0.0 && self.grid_step.is_finite()) {
            return Err(SimError::Config(format!(
                "grid_step must be positive, got {}",
                self.grid_step
            )));
        }
        self.search_box.validate().map_err(SimError::Config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = SimConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.stations.len(), 3);
        assert!(cfg.search_box.contains(cfg.source.latitude, cfg.source.longitude));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg = SimConfig::from_json(r#"{"seed": 7, "p_threshold": 0.6}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert!((cfg.p_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(cfg.stations, SimConfig::default().stations);
    }

    #[test]
    fn test_json_round_trip_of_defaults() {
        let json = serde_json::to_string_pretty(&SimConfig::default()).unwrap();
        let back = SimConfig::from_json(&json).unwrap();
        assert_eq!(back, SimConfig::default());
    }

    #[test]
    fn test_rejects_invalid() {
        let mut cfg = SimConfig::default();
        cfg.stations.clear();
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));

        let mut cfg = SimConfig::default();
        cfg.velocity = VelocityModel { vp: 3.0, vs: 3.5 };
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.dt = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SimConfig::default();
        cfg.grid_step = -0.01;
        assert!(cfg.validate().is_err());

        // An unbounded settle period would never reach the solve
        let mut cfg = SimConfig::default();
        cfg.settle_ticks = u64::MAX;
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));
        cfg.settle_ticks = cfg.max_ticks;
        assert!(cfg.validate().is_err());
        cfg.settle_ticks = cfg.max_ticks - 1;
        assert!(cfg.validate().is_ok());

        assert!(matches!(
            SimConfig::from_json("{not json"),
            Err(SimError::Parse(_))
        ));
    }

    #[test]
    fn test_noiseless() {
        let cfg = SimConfig::default().noiseless();
        assert!(cfg.noise_sigma.abs() < f64::EPSILON);
        assert!(cfg.prob_sigma.abs() < f64::EPSILON);
    }
}
