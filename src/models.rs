//! Data model shared across the pipeline.
//!
//! Stations, the ground-truth source, the velocity model, and the final
//! solution. Everything here is plain data and serializes to JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::haversine_distance;

/// A recording station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station code (e.g., "HUAL")
    pub code: String,
    /// Latitude (degrees)
    pub latitude: f64,
    /// Longitude (degrees)
    pub longitude: f64,
}

impl Station {
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            code: code.into(),
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to a point in kilometers.
    #[must_use]
    pub fn distance_km(&self, lat: f64, lon: f64) -> f64 {
        haversine_distance(self.latitude, self.longitude, lat, lon)
    }
}

/// Ground-truth event the generator synthesizes. Never visible to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Latitude (degrees)
    pub latitude: f64,
    /// Longitude (degrees)
    pub longitude: f64,
    /// Origin time in ticks since run start
    pub origin_tick: u64,
}

/// Constant P and S wave speeds, km per simulated second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityModel {
    pub vp: f64,
    pub vs: f64,
}

impl Default for VelocityModel {
    fn default() -> Self {
        Self { vp: 6.0, vs: 3.5 }
    }
}

/// Seismic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    P,
    S,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::P => "P",
            Self::S => "S",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Located event with its derived magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Solved latitude (degrees)
    pub latitude: f64,
    /// Solved longitude (degrees)
    pub longitude: f64,
    /// Origin time in seconds since run start
    pub origin_time: f64,
    /// Sum of squared P residuals (s²)
    pub misfit: f64,
    /// Local-magnitude-like estimate; `None` only with no usable stations
    pub magnitude: Option<f64>,
    /// Number of stations used in the solve
    pub stations_used: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_distance() {
        let sta = Station::new("HUAL", 23.9769, 121.6044);
        assert!(sta.distance_km(sta.latitude, sta.longitude).abs() < 1e-9);
        let d = sta.distance_km(23.84, 121.24);
        assert!(d > 35.0 && d < 45.0);
    }

    #[test]
    fn test_phase_serde() {
        assert_eq!(serde_json::to_string(&Phase::P).unwrap(), "\"P\"");
        let s: Phase = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(s, Phase::S);
        assert_eq!(Phase::S.to_string(), "S");
    }
}
