//! Streaming mean and variance.
//!
//! Uses Welford's online update, which tracks the running mean and the sum
//! of squared deviations (`m2`) and never forms `E[X²]`, so tightly
//! clustered outputs keep their variance digits.

use serde::Serialize;

use crate::error::{Error, Result};

/// Divisor convention for variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceKind {
    /// Divide by `n`: the samples are the whole population being summarised.
    #[default]
    Population,
    /// Divide by `n - 1` (Bessel's correction).
    Sample,
}

/// Mean and variance of one sample buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanAndVariance {
    pub mean: f64,
    pub variance: f64,
}

impl MeanAndVariance {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Single-pass accumulator for count, mean, variance, min and max.
#[derive(Debug, Clone)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// `None` before the first observation.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// `None` before the first observation; exactly 0 for a single one,
    /// under either convention.
    pub fn variance(&self, kind: VarianceKind) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => {
                let divisor = match kind {
                    VarianceKind::Population => n as f64,
                    VarianceKind::Sample => (n - 1) as f64,
                };
                // m2 can drift a few ulps below zero for constant input.
                Some((self.m2 / divisor).max(0.0))
            }
        }
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    /// Population mean and variance, or [`Error::EmptySampleBuffer`].
    pub fn finish(&self) -> Result<MeanAndVariance> {
        match (self.mean(), self.variance(VarianceKind::Population)) {
            (Some(mean), Some(variance)) => Ok(MeanAndVariance { mean, variance }),
            _ => Err(Error::EmptySampleBuffer),
        }
    }
}

impl Extend<f64> for RunningStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

/// Population mean and variance of `samples`.
///
/// Rejects an empty slice instead of dividing by zero.
pub fn mean_and_variance(samples: &[f64]) -> Result<MeanAndVariance> {
    if samples.is_empty() {
        return Err(Error::EmptySampleBuffer);
    }
    let mut stats = RunningStats::new();
    stats.extend(samples.iter().copied());
    stats.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::statistics::Statistics;

    #[test]
    fn test_empty_is_rejected() {
        assert!(matches!(
            mean_and_variance(&[]),
            Err(Error::EmptySampleBuffer)
        ));
        assert!(RunningStats::new().finish().is_err());
        assert_eq!(RunningStats::new().mean(), None);
    }

    #[test]
    fn test_single_sample_has_zero_variance() {
        for x in [0.0, 48.77, -1e9, 1e300] {
            let mv = mean_and_variance(&[x]).unwrap();
            assert_eq!(mv.mean, x);
            assert_eq!(mv.variance, 0.0);
        }
        let mut stats = RunningStats::new();
        stats.push(3.0);
        assert_eq!(stats.variance(VarianceKind::Sample), Some(0.0));
    }

    #[test]
    fn test_known_values() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mv = mean_and_variance(&data).unwrap();
        assert!((mv.mean - 5.0).abs() < 1e-12);
        assert!((mv.variance - 4.0).abs() < 1e-12);
        assert!((mv.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sample_vs_population() {
        let mut stats = RunningStats::new();
        stats.extend([1.0, 2.0, 3.0, 4.0]);
        let pop = stats.variance(VarianceKind::Population).unwrap();
        let sample = stats.variance(VarianceKind::Sample).unwrap();
        assert!((pop - 1.25).abs() < 1e-12);
        assert!((sample - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_matches_statrs() {
        let data: Vec<f64> = (0..5000)
            .map(|i| 48.0 + ((i * 7919) % 1000) as f64 * 1e-4)
            .collect();
        let mv = mean_and_variance(&data).unwrap();
        assert!((mv.mean - data.iter().mean()).abs() < 1e-9);
        assert!((mv.variance - data.iter().population_variance()).abs() < 1e-12);
    }

    #[test]
    fn test_min_max() {
        let mut stats = RunningStats::new();
        stats.extend([3.0, -1.0, 8.5, 2.0]);
        assert_eq!(stats.min(), Some(-1.0));
        assert_eq!(stats.max(), Some(8.5));
        assert_eq!(stats.count(), 4);
    }

    #[test]
    fn test_constant_input_never_negative() {
        let data = vec![1000.1; 10_000];
        let mv = mean_and_variance(&data).unwrap();
        assert!(mv.variance >= 0.0);
        assert!(mv.variance < 1e-20);
    }

    #[test]
    fn test_large_mean_small_spread_is_stable() {
        // 1e6 samples around 1000 with spread 0.01: E[X²] - E[X]² loses
        // nearly all significant digits here.
        let n = 1_000_000;
        let data: Vec<f64> = (0..n)
            .map(|i| 1000.0 + if i % 2 == 0 { 0.01 } else { -0.01 })
            .collect();
        let mv = mean_and_variance(&data).unwrap();
        assert!(mv.variance.is_finite());
        assert!((mv.mean - 1000.0).abs() < 1e-9);
        assert!(
            (mv.variance - 1e-4).abs() < 1e-10,
            "variance {}",
            mv.variance
        );
    }
}
