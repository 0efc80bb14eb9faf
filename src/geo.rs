//! Geodesy helpers and the location search box.
//!
//! Distances use a spherical Earth and the haversine formula.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers for haversine calculations.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the great-circle distance between two points using the haversine formula.
///
/// Returns distance in kilometers.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let delta_lat = (lat2 - lat1) * PI / 180.0;
    let delta_lon = (lon2 - lon1) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Latitude/longitude bounds for the grid search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl std::str::FromStr for SearchBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 4 {
            return Err(format!(
                "bbox requires 4 values (minlat,minlon,maxlat,maxlon), got {}",
                parts.len()
            ));
        }

        let vals: Result<Vec<f64>, _> = parts.iter().map(|p| p.trim().parse::<f64>()).collect();
        let vals = vals.map_err(|e| format!("invalid number in bbox: {e}"))?;

        let bbox = Self {
            min_lat: vals[0],
            min_lon: vals[1],
            max_lat: vals[2],
            max_lon: vals[3],
        };
        bbox.validate()?;
        Ok(bbox)
    }
}

impl SearchBox {
    /// Check ranges and ordering of the bounds.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated bound.
    pub fn validate(&self) -> Result<(), String> {
        for (name, lat) in [("min_lat", self.min_lat), ("max_lat", self.max_lat)] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("{name} {lat} out of range [-90, 90]"));
            }
        }
        for (name, lon) in [("min_lon", self.min_lon), ("max_lon", self.max_lon)] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("{name} {lon} out of range [-180, 180]"));
            }
        }
        if self.min_lat > self.max_lat {
            return Err(format!(
                "min_lat {} must be <= max_lat {}",
                self.min_lat, self.max_lat
            ));
        }
        if self.min_lon > self.max_lon {
            return Err(format!(
                "min_lon {} must be <= max_lon {}",
                self.min_lon, self.max_lon
            ));
        }
        Ok(())
    }

    /// Check if a point is within the box.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Number of grid nodes along (lat, lon) at the given step, edges included.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn grid_dims(&self, step: f64) -> (usize, usize) {
        // Small slack so a max bound that is an exact multiple of step survives rounding
        let n = |span: f64| (span / step + 1e-9).floor() as usize + 1;
        (n(self.max_lat - self.min_lat), n(self.max_lon - self.min_lon))
    }

    /// Iterate grid nodes in scan order: latitude-major, longitude-minor.
    ///
    /// Each node is `min + i * step`, so no drift accumulates across the box.
    pub fn grid(&self, step: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let (n_lat, n_lon) = self.grid_dims(step);
        (0..n_lat).flat_map(move |i| {
            #[allow(clippy::cast_precision_loss)]
            let lat = self.min_lat + i as f64 * step;
            (0..n_lon).map(move |j| {
                #[allow(clippy::cast_precision_loss)]
                let lon = self.min_lon + j as f64 * step;
                (lat, lon)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine() {
        // Taipei to Kaohsiung is roughly 300 km
        let distance = haversine_distance(25.03, 121.56, 22.63, 120.30);
        assert!(distance > 280.0 && distance < 320.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let ab = haversine_distance(23.97, 121.60, 24.15, 120.67);
        let ba = haversine_distance(24.15, 120.67, 23.97, 121.60);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_zero_and_non_negative() {
        assert!(haversine_distance(23.5, 121.0, 23.5, 121.0).abs() < 1e-12);
        assert!(haversine_distance(-10.0, 170.0, 10.0, -170.0) >= 0.0);
        // Antipodal points stay finite
        let half = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!((half - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_bbox_parse() {
        let bbox: SearchBox = "21.8,119.9,25.4,122.1".parse().unwrap();
        assert!((bbox.min_lat - 21.8).abs() < 0.001);
        assert!((bbox.max_lon - 122.1).abs() < 0.001);
        assert!(bbox.contains(23.5, 121.0));
        assert!(!bbox.contains(26.0, 121.0));
    }

    #[test]
    fn test_bbox_rejects_bad_input() {
        assert!("1,2,3".parse::<SearchBox>().is_err());
        assert!("25,119,22,121".parse::<SearchBox>().is_err());
        assert!("21,119,95,121".parse::<SearchBox>().is_err());
        assert!("21,x,22,121".parse::<SearchBox>().is_err());
    }

    #[test]
    fn test_grid_scan_order_and_edges() {
        let bbox = SearchBox {
            min_lat: 0.0,
            min_lon: 10.0,
            max_lat: 0.04,
            max_lon: 10.02,
        };
        assert_eq!(bbox.grid_dims(0.02), (3, 2));

        let nodes: Vec<(f64, f64)> = bbox.grid(0.02).collect();
        assert_eq!(nodes.len(), 6);
        // Latitude-major: longitude varies fastest
        assert!((nodes[0].0 - 0.0).abs() < 1e-12 && (nodes[0].1 - 10.0).abs() < 1e-12);
        assert!((nodes[1].0 - 0.0).abs() < 1e-12 && (nodes[1].1 - 10.02).abs() < 1e-12);
        assert!((nodes[5].0 - 0.04).abs() < 1e-12 && (nodes[5].1 - 10.02).abs() < 1e-12);
    }
}
