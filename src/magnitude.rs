//! Local-magnitude-like estimate from peak amplitude and epicentral distance.
//!
//! Per station: `log10(A) + a·log10(R) + b·R + c`, averaged over stations.

use crate::geo::haversine_distance;
use crate::locate::Observation;

/// Distance term coefficient on `log10(R)`.
pub const COEF_LOG_DISTANCE: f64 = 1.10;

/// Linear distance coefficient (per km).
pub const COEF_DISTANCE: f64 = 0.003;

/// Constant offset.
pub const COEF_CONSTANT: f64 = 2.0;

/// Floor on distance (km) so stations on top of the epicenter stay finite.
pub const MIN_DISTANCE_KM: f64 = 1.0;

/// Floor on amplitude so a silent trace stays finite.
pub const MIN_AMPLITUDE: f64 = 1e-6;

/// Contribution of one station at `distance_km` with `peak_amplitude`.
#[must_use]
pub fn station_magnitude(peak_amplitude: f64, distance_km: f64) -> f64 {
    let r = distance_km.max(MIN_DISTANCE_KM);
    let a = peak_amplitude.max(MIN_AMPLITUDE);
    a.log10() + COEF_LOG_DISTANCE * r.log10() + COEF_DISTANCE * r + COEF_CONSTANT
}

/// Mean station magnitude for an epicenter at (`lat`, `lon`).
///
/// Returns `None` when there are no observations.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate(observations: &[Observation], lat: f64, lon: f64) -> Option<f64> {
    if observations.is_empty() {
        return None;
    }
    let total: f64 = observations
        .iter()
        .map(|obs| {
            let d = haversine_distance(obs.latitude, obs.longitude, lat, lon);
            station_magnitude(obs.peak_amplitude, d)
        })
        .sum();
    Some(total / observations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(latitude: f64, longitude: f64, peak_amplitude: f64) -> Observation {
        Observation {
            code: "X".into(),
            latitude,
            longitude,
            p_time: 0.0,
            peak_amplitude,
        }
    }

    #[test]
    fn test_station_magnitude_formula() {
        // log10(1) + 1.1·log10(100) + 0.003·100 + 2.0
        assert!((station_magnitude(1.0, 100.0) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_floors() {
        // Zero distance is treated as 1 km, zero amplitude as epsilon
        let m = station_magnitude(0.0, 0.0);
        assert!(m.is_finite());
        assert!((m - (MIN_AMPLITUDE.log10() + COEF_DISTANCE + COEF_CONSTANT)).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_is_mean() {
        // Stations at the epicenter hit the distance floor
        let stations = [obs(23.0, 121.0, 1.0), obs(23.0, 121.0, 100.0)];
        let m = estimate(&stations, 23.0, 121.0).unwrap();
        let expected = (station_magnitude(1.0, 1.0) + station_magnitude(100.0, 1.0)) / 2.0;
        assert!((m - expected).abs() < 1e-12);
    }

    #[test]
    fn test_estimate_empty() {
        assert!(estimate(&[], 23.0, 121.0).is_none());
    }

    #[test]
    fn test_bigger_amplitude_bigger_magnitude() {
        let near = estimate(&[obs(23.5, 121.0, 0.2)], 23.0, 121.0).unwrap();
        let loud = estimate(&[obs(23.5, 121.0, 1.2)], 23.0, 121.0).unwrap();
        assert!(loud > near);
    }
}
