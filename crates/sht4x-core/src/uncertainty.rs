//! Seam to an uncertainty-tracking substrate, plus empirical tail estimates.
//!
//! An [`UncertaintyBackend`] supplies two primitives: drawing a uniform
//! distributional value, and querying `P(X > t)` for such a value. Backends
//! that propagate full distributions through arithmetic live outside this
//! crate; [`PointBackend`] is the behaviour of those primitives without
//! uncertainty tracking, where a distribution collapses to one random draw.
//!
//! Under Monte Carlo the same tail queries are answered from the sample
//! buffer by [`EmpiricalDistribution`].

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::calibration::{Calibratable, InputSample};
use crate::sampler::{SamplerConfig, UniformRange};

/// Answers `P(X > threshold)` for some uncertain quantity `X`.
pub trait TailProbability {
    /// Probability in `[0, 1]` that the quantity strictly exceeds `threshold`.
    fn probability_greater_than(&self, threshold: f64) -> f64;
}

/// External uncertainty-propagation primitives.
pub trait UncertaintyBackend {
    /// Distributional value; flows through the calibration arithmetic.
    type Value: Calibratable;

    /// A value uniformly distributed over `range`.
    fn uniform(&mut self, range: &UniformRange) -> Self::Value;

    /// Probability in `[0, 1]` that `value` exceeds `threshold`.
    fn probability_greater_than(&self, value: &Self::Value, threshold: f64) -> f64;

    /// Scalar summary used for display and benchmarking.
    fn expected_value(&self, value: &Self::Value) -> f64;
}

/// Draw all three inputs through `backend`.
pub fn draw_inputs<B: UncertaintyBackend>(
    backend: &mut B,
    config: &SamplerConfig,
) -> InputSample<B::Value> {
    InputSample {
        vrh: backend.uniform(&config.vrh),
        vt: backend.uniform(&config.vt),
        vsupply: backend.uniform(&config.vsupply),
    }
}

/// A backend value paired with the backend that can query it.
pub struct Distributional<'a, B: UncertaintyBackend> {
    backend: &'a B,
    value: B::Value,
}

impl<'a, B: UncertaintyBackend> Distributional<'a, B> {
    pub fn new(backend: &'a B, value: B::Value) -> Self {
        Self { backend, value }
    }

    pub fn expected_value(&self) -> f64 {
        self.backend.expected_value(&self.value)
    }
}

impl<B: UncertaintyBackend> TailProbability for Distributional<'_, B> {
    fn probability_greater_than(&self, threshold: f64) -> f64 {
        self.backend.probability_greater_than(&self.value, threshold)
    }
}

/// Backend without uncertainty tracking: each uniform is a single draw and
/// tail probabilities are 0 or 1.
#[derive(Debug, Clone)]
pub struct PointBackend<R = StdRng> {
    rng: R,
}

impl<R: Rng> PointBackend<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl PointBackend<StdRng> {
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> UncertaintyBackend for PointBackend<R> {
    type Value = f64;

    fn uniform(&mut self, range: &UniformRange) -> f64 {
        self.rng.random_range(range.low()..=range.high())
    }

    fn probability_greater_than(&self, value: &f64, threshold: f64) -> f64 {
        if *value > threshold { 1.0 } else { 0.0 }
    }

    fn expected_value(&self, value: &f64) -> f64 {
        *value
    }
}

/// Tail probabilities estimated as the fraction of samples beyond a
/// threshold.
#[derive(Debug, Clone, Copy)]
pub struct EmpiricalDistribution<'a> {
    samples: &'a [f64],
}

impl<'a> EmpiricalDistribution<'a> {
    pub fn new(samples: &'a [f64]) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl TailProbability for EmpiricalDistribution<'_> {
    /// Zero for an empty sample set.
    fn probability_greater_than(&self, threshold: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let above = self.samples.iter().filter(|&&x| x > threshold).count();
        above as f64 / self.samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{OutputChannel, OutputSelector, calibrate};

    #[test]
    fn test_empirical_fraction() {
        let data = [1.0, 2.0, 3.0, 4.0];
        let dist = EmpiricalDistribution::new(&data);
        assert_eq!(dist.probability_greater_than(0.0), 1.0);
        assert_eq!(dist.probability_greater_than(2.0), 0.5);
        assert_eq!(dist.probability_greater_than(2.5), 0.5);
        assert_eq!(dist.probability_greater_than(4.0), 0.0);
    }

    #[test]
    fn test_empirical_empty_is_zero() {
        let dist = EmpiricalDistribution::new(&[]);
        assert!(dist.is_empty());
        assert_eq!(dist.probability_greater_than(-1e300), 0.0);
    }

    #[test]
    fn test_point_backend_draws_in_range() {
        let mut backend = PointBackend::with_seed(Some(3));
        let config = SamplerConfig::default();
        for _ in 0..1000 {
            let s = draw_inputs(&mut backend, &config);
            assert!(config.vrh.contains(s.vrh));
            assert!(config.vt.contains(s.vt));
            assert!(config.vsupply.contains(s.vsupply));
        }
    }

    #[test]
    fn test_point_backend_tail_is_indicator() {
        let backend = PointBackend::with_seed(Some(0));
        let value = Distributional::new(&backend, 10.0);
        assert_eq!(value.probability_greater_than(9.5), 1.0);
        assert_eq!(value.probability_greater_than(10.0), 0.0);
        assert_eq!(value.expected_value(), 10.0);
    }

    #[test]
    fn test_backend_values_flow_through_calibration() {
        let mut backend = PointBackend::with_seed(Some(21));
        let inputs = draw_inputs(&mut backend, &SamplerConfig::default());
        let outputs = calibrate(&inputs, OutputSelector::All);
        let expected = -12.5 + 125.0 * inputs.vrh / inputs.vsupply;
        let rh = outputs.get(OutputChannel::RelativeHumidity).unwrap();
        assert!((backend.expected_value(&rh) - expected).abs() < 1e-9);
    }
}
