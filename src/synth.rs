//! Synthetic trace generator.
//!
//! Produces, for one station and one tick, a noisy ground-motion sample
//! carrying P and S pulses plus per-phase detection probabilities. The
//! probabilities are a Gaussian bump around the true onset, standing in for
//! the confidence curve of a learned phase detector.

use rand::Rng;

use crate::models::{SourceEvent, Station, VelocityModel};
use crate::signal::{GaussianNoise, probability_bump, wavelet};

/// Amplitude clip, symmetric (models sensor/display saturation).
pub const AMPLITUDE_CLIP: f64 = 1.6;

/// Floor of the detection-probability curve.
pub const PROB_FLOOR: f64 = 0.02;

/// Half-width of the detection-probability bump, in ticks.
pub const PROB_HALF_WIDTH_TICKS: f64 = 6.0;

/// Shape of one phase pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseShape {
    pub amplitude: f64,
    pub freq_hz: f64,
    pub decay: f64,
}

/// P pulse: smaller, higher frequency, fast decay.
pub const P_PULSE: PulseShape = PulseShape {
    amplitude: 0.6,
    freq_hz: 6.0,
    decay: 1.8,
};

/// S pulse: larger, lower frequency, slow decay.
pub const S_PULSE: PulseShape = PulseShape {
    amplitude: 1.2,
    freq_hz: 2.5,
    decay: 0.7,
};

/// One generated sample for one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSample {
    pub amplitude: f64,
    pub p_prob: f64,
    pub s_prob: f64,
    /// True once the tick is at or past the P onset
    pub p_arrived: bool,
}

/// Travel times from the source to one station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelTimes {
    pub distance_km: f64,
    pub p_seconds: f64,
    pub s_seconds: f64,
}

impl TravelTimes {
    fn new(distance_km: f64, velocity: VelocityModel) -> Self {
        Self {
            distance_km,
            p_seconds: distance_km / velocity.vp,
            s_seconds: distance_km / velocity.vs,
        }
    }
}

/// Generator bound to one source event and station list.
///
/// Travel times and onset ticks are computed once at construction.
#[derive(Debug, Clone)]
pub struct TraceGenerator {
    travel: Vec<TravelTimes>,
    /// (P onset, S onset) in fractional ticks, per station
    onsets: Vec<(f64, f64)>,
    dt: f64,
    amplitude_noise: GaussianNoise,
    prob_noise: GaussianNoise,
}

impl TraceGenerator {
    #[must_use]
    pub fn new(
        stations: &[Station],
        source: SourceEvent,
        velocity: VelocityModel,
        dt: f64,
        noise_sigma: f64,
        prob_sigma: f64,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let origin = source.origin_tick as f64;
        let travel: Vec<TravelTimes> = stations
            .iter()
            .map(|sta| {
                TravelTimes::new(sta.distance_km(source.latitude, source.longitude), velocity)
            })
            .collect();
        let onsets = travel
            .iter()
            .map(|tt| (origin + tt.p_seconds / dt, origin + tt.s_seconds / dt))
            .collect();

        Self {
            travel,
            onsets,
            dt,
            amplitude_noise: GaussianNoise::new(noise_sigma),
            prob_noise: GaussianNoise::new(prob_sigma),
        }
    }

    /// Travel times for the station at `index`.
    #[must_use]
    pub fn travel_times(&self, index: usize) -> Option<TravelTimes> {
        self.travel.get(index).copied()
    }

    /// Fractional (P, S) onset ticks for the station at `index`.
    #[must_use]
    pub fn onset_ticks(&self, index: usize) -> Option<(f64, f64)> {
        self.onsets.get(index).copied()
    }

    /// Generate the sample for station `index` at `tick`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a station this generator was built with.
    pub fn sample<R: Rng + ?Sized>(&self, index: usize, tick: u64, rng: &mut R) -> TraceSample {
        let (p_onset, s_onset) = self.onsets[index];
        #[allow(clippy::cast_precision_loss)]
        let k = tick as f64;

        let mut amplitude = self.amplitude_noise.sample(rng);
        let p_arrived = k >= p_onset;
        if p_arrived {
            amplitude += pulse(P_PULSE, (k - p_onset) * self.dt);
        }
        if k >= s_onset {
            amplitude += pulse(S_PULSE, (k - s_onset) * self.dt);
        }

        let p_prob = self.probability(k, p_onset, rng);
        let s_prob = self.probability(k, s_onset, rng);

        TraceSample {
            amplitude: amplitude.clamp(-AMPLITUDE_CLIP, AMPLITUDE_CLIP),
            p_prob,
            s_prob,
            p_arrived,
        }
    }

    fn probability<R: Rng + ?Sized>(&self, k: f64, onset: f64, rng: &mut R) -> f64 {
        let base = probability_bump(k, onset, PROB_HALF_WIDTH_TICKS, PROB_FLOOR);
        (base + self.prob_noise.sample(rng)).clamp(0.0, 1.0)
    }
}

fn pulse(shape: PulseShape, elapsed_s: f64) -> f64 {
    shape.amplitude * wavelet(elapsed_s, shape.freq_hz, shape.decay)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::SimConfig;

    fn generator(cfg: &SimConfig) -> TraceGenerator {
        TraceGenerator::new(
            &cfg.stations,
            cfg.source,
            cfg.velocity,
            cfg.dt,
            cfg.noise_sigma,
            cfg.prob_sigma,
        )
    }

    #[test]
    fn test_p_before_s() {
        let cfg = SimConfig::default();
        let generator = generator(&cfg);
        for i in 0..cfg.stations.len() {
            let tt = generator.travel_times(i).unwrap();
            assert!(tt.distance_km > 0.0);
            assert!(tt.p_seconds <= tt.s_seconds);
            let (p, s) = generator.onset_ticks(i).unwrap();
            assert!(p < s);
        }
    }

    #[test]
    fn test_noiseless_quiet_before_onset() {
        let cfg = SimConfig::default().noiseless();
        let generator = generator(&cfg);
        let mut rng = StdRng::seed_from_u64(1);

        let sample = generator.sample(0, 0, &mut rng);
        assert!(sample.amplitude.abs() < f64::EPSILON);
        assert!(!sample.p_arrived);
        assert!((sample.p_prob - PROB_FLOOR).abs() < 1e-9);
        assert!((sample.s_prob - PROB_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn test_probability_peaks_at_onset() {
        let cfg = SimConfig::default().noiseless();
        let generator = generator(&cfg);
        let mut rng = StdRng::seed_from_u64(1);
        let (p_onset, _) = generator.onset_ticks(0).unwrap();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nearest = p_onset.round() as u64;
        let sample = generator.sample(0, nearest, &mut rng);
        assert!(sample.p_prob > 0.98);

        let later = generator.sample(0, nearest + 2, &mut rng);
        assert!(later.p_arrived);
    }

    #[test]
    fn test_amplitude_clipped_and_probability_bounded() {
        let mut cfg = SimConfig::default();
        cfg.noise_sigma = 5.0;
        cfg.prob_sigma = 5.0;
        let generator = generator(&cfg);
        let mut rng = StdRng::seed_from_u64(3);

        for tick in 0..500 {
            let s = generator.sample(1, tick, &mut rng);
            assert!(s.amplitude.abs() <= AMPLITUDE_CLIP);
            assert!((0.0..=1.0).contains(&s.p_prob));
            assert!((0.0..=1.0).contains(&s.s_prob));
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let cfg = SimConfig::default();
        let generator = generator(&cfg);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for tick in 0..50 {
            assert_eq!(generator.sample(2, tick, &mut a), generator.sample(2, tick, &mut b));
        }
    }
}
