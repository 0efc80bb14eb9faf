//! Grid-search epicenter location.
//!
//! For every node of a uniform lat/lon grid the origin time has a closed
//! form (mean of `t_i - d_i/vp`), so the search is only over position. The
//! node with the smallest sum of squared P residuals wins; the first node in
//! scan order wins ties.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::errors::LocateError;
use crate::geo::{SearchBox, haversine_distance};

/// Minimum number of P observations for a constrained solve.
pub const MIN_OBSERVATIONS: usize = 2;

/// One station's contribution to the solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Absolute P pick time in seconds since run start
    pub p_time: f64,
    /// Peak absolute amplitude observed at the station
    pub peak_amplitude: f64,
}

/// Best-fit grid node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Origin time in seconds since run start
    pub origin_time: f64,
    /// Sum of squared residuals (s²)
    pub misfit: f64,
    /// Observed minus predicted P time per observation, in input order
    pub residuals: Vec<f64>,
    /// Grid nodes evaluated
    pub nodes: usize,
}

/// Invert P pick times for an epicenter and origin time.
///
/// # Errors
///
/// Returns `LocateError::InsufficientPicks` with fewer than two observations.
#[instrument(skip(observations, search_box), fields(stations = observations.len()))]
#[allow(clippy::cast_precision_loss)]
pub fn solve(
    observations: &[Observation],
    vp: f64,
    search_box: &SearchBox,
    step: f64,
) -> Result<Location, LocateError> {
    if observations.len() < MIN_OBSERVATIONS {
        return Err(LocateError::InsufficientPicks {
            usable: observations.len(),
        });
    }

    let n = observations.len() as f64;
    let mut travel = vec![0.0; observations.len()];
    // (misfit, lat, lon, origin_time)
    let mut best: Option<(f64, f64, f64, f64)> = None;
    let mut nodes = 0usize;

    for (lat, lon) in search_box.grid(step) {
        nodes += 1;
        for (tt, obs) in travel.iter_mut().zip(observations) {
            *tt = haversine_distance(obs.latitude, obs.longitude, lat, lon) / vp;
        }

        let origin_time = observations
            .iter()
            .zip(&travel)
            .map(|(obs, tt)| obs.p_time - tt)
            .sum::<f64>()
            / n;

        let misfit: f64 = observations
            .iter()
            .zip(&travel)
            .map(|(obs, tt)| (obs.p_time - (origin_time + tt)).powi(2))
            .sum();

        if best.is_none_or(|(m, ..)| misfit < m) {
            best = Some((misfit, lat, lon, origin_time));
        }
    }

    let Some((misfit, latitude, longitude, origin_time)) = best else {
        // A validated box always has at least one node
        return Err(LocateError::InsufficientPicks {
            usable: observations.len(),
        });
    };

    let residuals = observations
        .iter()
        .map(|obs| {
            let d = haversine_distance(obs.latitude, obs.longitude, latitude, longitude);
            obs.p_time - (origin_time + d / vp)
        })
        .collect();

    debug!(latitude, longitude, origin_time, misfit, nodes, "grid search finished");

    Ok(Location {
        latitude,
        longitude,
        origin_time,
        misfit,
        residuals,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VP: f64 = 6.0;
    const STEP: f64 = 0.02;

    fn taiwan_box() -> SearchBox {
        SearchBox {
            min_lat: 21.8,
            min_lon: 119.9,
            max_lat: 25.4,
            max_lon: 122.1,
        }
    }

    fn stations() -> Vec<(&'static str, f64, f64)> {
        vec![
            ("HUAL", 23.9769, 121.6044),
            ("TCU", 24.1477, 120.6736),
            ("KAU", 22.6273, 120.3014),
        ]
    }

    /// Exact arrival times for a source at (lat, lon) with origin `t0`.
    fn exact_observations(lat: f64, lon: f64, t0: f64) -> Vec<Observation> {
        stations()
            .into_iter()
            .map(|(code, sla, slo)| Observation {
                code: code.to_string(),
                latitude: sla,
                longitude: slo,
                p_time: t0 + haversine_distance(sla, slo, lat, lon) / VP,
                peak_amplitude: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_recovers_on_grid_source() {
        let bbox = taiwan_box();
        let obs = exact_observations(23.84, 121.24, 1.0);
        let loc = solve(&obs, VP, &bbox, STEP).unwrap();

        assert!((loc.latitude - 23.84).abs() < STEP / 2.0);
        assert!((loc.longitude - 121.24).abs() < STEP / 2.0);
        assert!(loc.misfit < 1e-12);
        assert!((loc.origin_time - 1.0).abs() < 1e-6);
        assert!(loc.residuals.iter().all(|r| r.abs() < 1e-6));
        assert_eq!(loc.nodes, 181 * 111);
    }

    #[test]
    fn test_off_grid_source_within_one_step() {
        let bbox = taiwan_box();
        let obs = exact_observations(23.513, 120.887, 4.2);
        let loc = solve(&obs, VP, &bbox, STEP).unwrap();

        assert!((loc.latitude - 23.513).abs() <= STEP);
        assert!((loc.longitude - 120.887).abs() <= STEP);
    }

    #[test]
    fn test_single_observation_rejected() {
        let bbox = taiwan_box();
        let mut obs = exact_observations(23.84, 121.24, 1.0);
        obs.truncate(1);

        assert_eq!(
            solve(&obs, VP, &bbox, STEP),
            Err(LocateError::InsufficientPicks { usable: 1 })
        );
        assert_eq!(
            solve(&[], VP, &bbox, STEP),
            Err(LocateError::InsufficientPicks { usable: 0 })
        );
    }

    #[test]
    fn test_two_observations_solve() {
        let bbox = taiwan_box();
        let mut obs = exact_observations(23.84, 121.24, 1.0);
        obs.truncate(2);

        // Two stations leave a curve of perfect fits; any of them is acceptable
        let loc = solve(&obs, VP, &bbox, STEP).unwrap();
        assert!(loc.misfit < 1e-3);
        assert!(bbox.contains(loc.latitude, loc.longitude));
    }

    #[test]
    fn test_tie_break_first_in_scan_order() {
        // Identical times at both stations: every node on the perpendicular
        // bisector fits perfectly, and the scan meets the southernmost first.
        let bbox = SearchBox {
            min_lat: -0.1,
            min_lon: -0.1,
            max_lat: 0.1,
            max_lon: 0.1,
        };
        let obs = vec![
            Observation {
                code: "W".into(),
                latitude: 0.0,
                longitude: -1.0,
                p_time: 10.0,
                peak_amplitude: 1.0,
            },
            Observation {
                code: "E".into(),
                latitude: 0.0,
                longitude: 1.0,
                p_time: 10.0,
                peak_amplitude: 1.0,
            },
        ];
        let loc = solve(&obs, VP, &bbox, 0.05).unwrap();
        assert!((loc.latitude - (-0.1)).abs() < 1e-9);
        assert!(loc.longitude.abs() < 1e-9);
    }
}
