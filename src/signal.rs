//! Stochastic signal primitives used by the trace generator.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Damped sinusoid: `sin(2π·f·t)·exp(−λ·t)` for `t ≥ 0`, zero before onset.
#[must_use]
pub fn wavelet(elapsed_s: f64, freq_hz: f64, decay: f64) -> f64 {
    if elapsed_s < 0.0 {
        return 0.0;
    }
    (2.0 * PI * freq_hz * elapsed_s).sin() * (-decay * elapsed_s).exp()
}

/// Gaussian bump centered on `center`, raised by `floor` and scaled to peak at 1.
#[must_use]
pub fn probability_bump(tick: f64, center: f64, half_width: f64, floor: f64) -> f64 {
    let z = (tick - center) / half_width;
    floor + (1.0 - floor) * (-0.5 * z * z).exp()
}

/// Zero-mean Gaussian noise source with a fixed standard deviation.
///
/// A sigma of zero yields exactly zero without consuming randomness.
#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    dist: Option<Normal<f64>>,
}

impl GaussianNoise {
    /// Build a noise source. Non-finite or non-positive sigma disables noise.
    #[must_use]
    pub fn new(sigma: f64) -> Self {
        let dist = if sigma.is_finite() && sigma > 0.0 {
            Normal::new(0.0, sigma).ok()
        } else {
            None
        };
        Self { dist }
    }

    /// Draw one sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.map_or(0.0, |d| d.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_wavelet_shape() {
        assert!(wavelet(-0.1, 5.0, 1.0).abs() < f64::EPSILON);
        assert!(wavelet(0.0, 5.0, 1.0).abs() < 1e-12);
        // Quarter period of a 5 Hz sine, lightly damped
        let quarter = wavelet(0.05, 5.0, 1.0);
        assert!((quarter - (-0.05f64).exp()).abs() < 1e-9);
        // Decay bounds the envelope
        assert!(wavelet(3.05, 5.0, 1.0).abs() < 0.05);
    }

    #[test]
    fn test_probability_bump() {
        assert!((probability_bump(10.0, 10.0, 6.0, 0.02) - 1.0).abs() < 1e-12);
        let far = probability_bump(100.0, 10.0, 6.0, 0.02);
        assert!((far - 0.02).abs() < 1e-9);
        // Symmetric about the center
        let before = probability_bump(7.0, 10.0, 6.0, 0.02);
        let after = probability_bump(13.0, 10.0, 6.0, 0.02);
        assert!((before - after).abs() < 1e-12);
    }

    #[test]
    fn test_noise_zero_sigma_is_silent() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = GaussianNoise::new(0.0);
        for _ in 0..10 {
            assert!(noise.sample(&mut rng).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_noise_seeded_reproducible() {
        let noise = GaussianNoise::new(0.5);
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let xs: Vec<f64> = (0..5).map(|_| noise.sample(&mut a)).collect();
        let ys: Vec<f64> = (0..5).map(|_| noise.sample(&mut b)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().any(|x| x.abs() > 0.0));
    }
}
