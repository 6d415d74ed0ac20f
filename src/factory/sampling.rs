//! Stochastic models for processing time and quality inspection.

use super::config::Moments;
use super::error::ConfigError;
use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};

/// Build a lognormal whose *linear-space* mean and standard deviation are
/// the given moments.
///
/// With `phi = sqrt(s^2 + m^2)` the underlying normal has
/// `mu = ln(m^2 / phi)` and `sigma = sqrt(ln(phi^2 / m^2))`.
pub fn lognormal_from_moments(target: Moments) -> Result<LogNormal<f64>, ConfigError> {
    let Moments { mean, std_dev } = target;
    if !(mean.is_finite() && mean > 0.0) {
        return Err(ConfigError::InvalidDistribution {
            what: "processing time",
            reason: format!("mean must be > 0, got {mean}"),
        });
    }
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        return Err(ConfigError::InvalidDistribution {
            what: "processing time",
            reason: format!("std_dev must be >= 0, got {std_dev}"),
        });
    }
    let phi = (std_dev * std_dev + mean * mean).sqrt();
    let mu = (mean * mean / phi).ln();
    let sigma = (phi * phi / (mean * mean)).ln().sqrt();
    LogNormal::new(mu, sigma).map_err(|e| ConfigError::InvalidDistribution {
        what: "processing time",
        reason: e.to_string(),
    })
}

/// Processing-time generator of one stage, in hours.
#[derive(Debug, Clone, Copy)]
pub struct ProcessTime {
    dist: LogNormal<f64>,
}

impl ProcessTime {
    pub fn new(target: Moments) -> Result<Self, ConfigError> {
        Ok(Self {
            dist: lognormal_from_moments(target)?,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }
}

/// Gaussian accept/reject check: a unit passes when the draw reaches the
/// acceptance threshold.
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    dist: Normal<f64>,
    threshold: f64,
}

impl QualityGate {
    pub fn new(quality: Moments, threshold: f64) -> Result<Self, ConfigError> {
        let dist = Normal::new(quality.mean, quality.std_dev).map_err(|e| {
            ConfigError::InvalidDistribution {
                what: "quality gate",
                reason: e.to_string(),
            }
        })?;
        Ok(Self { dist, threshold })
    }

    pub fn inspect<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.dist.sample(rng) >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLES: usize = 100_000;

    #[test]
    fn test_lognormal_matches_target_mean() {
        let time = ProcessTime::new(Moments::new(1.0, 0.2)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mean = (0..SAMPLES).map(|_| time.sample(&mut rng)).sum::<f64>() / SAMPLES as f64;
        assert!((mean - 1.0).abs() <= 0.02, "empirical mean {mean}");
    }

    #[test]
    fn test_lognormal_matches_target_spread() {
        let time = ProcessTime::new(Moments::new(2.0, 0.4)).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let draws: Vec<f64> = (0..SAMPLES).map(|_| time.sample(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / SAMPLES as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / SAMPLES as f64;
        assert!((mean - 2.0).abs() <= 0.04, "empirical mean {mean}");
        assert!((var.sqrt() - 0.4).abs() <= 0.02, "empirical std {}", var.sqrt());
        assert!(draws.iter().all(|x| *x > 0.0));
    }

    #[test]
    fn test_zero_spread_is_deterministic() {
        let time = ProcessTime::new(Moments::new(1.5, 0.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert!((time.sample(&mut rng) - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_moments_rejected() {
        assert!(lognormal_from_moments(Moments::new(0.0, 0.2)).is_err());
        assert!(lognormal_from_moments(Moments::new(1.0, -0.1)).is_err());
        assert!(QualityGate::new(Moments::new(0.9, -1.0), 0.8).is_err());
    }

    #[test]
    fn test_quality_gate_pass_rate() {
        // 1 - Phi((0.8 - 0.92) / 0.05) = Phi(2.4)
        let expected = 0.991_802;
        let gate = QualityGate::new(Moments::new(0.92, 0.05), 0.8).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let passed = (0..SAMPLES).filter(|_| gate.inspect(&mut rng)).count();
        let rate = passed as f64 / SAMPLES as f64;
        assert!((rate - expected).abs() <= 0.01, "pass rate {rate}");
    }
}
