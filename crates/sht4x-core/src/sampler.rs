//! Uniform input distributions and the per-iteration input sampler.
//!
//! Each of the three sensor voltages is drawn independently from its own
//! [`UniformRange`]. Draws are boundary-inclusive: every value lies in
//! `[low, high]`.

use std::str::FromStr;

use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;

use crate::calibration::InputSample;
use crate::error::{Error, Result};

pub const DEFAULT_VRH_RANGE: (f64, f64) = (2.3, 2.7);
pub const DEFAULT_VT_RANGE: (f64, f64) = (2.3, 2.7);
pub const DEFAULT_VSUPPLY_RANGE: (f64, f64) = (4.8, 5.4);

/// Closed interval `[low, high]` of a uniform distribution, with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRange {
    low: f64,
    high: f64,
}

impl UniformRange {
    /// Validate and build a range. `name` only labels the error.
    pub fn new(name: &'static str, low: f64, high: f64) -> Result<Self> {
        let reason = if !low.is_finite() || !high.is_finite() {
            Some("bounds must be finite")
        } else if low >= high {
            Some("low bound must be below high bound")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(Error::InvalidRange {
                name,
                low,
                high,
                reason,
            }),
            None => Ok(Self { low, high }),
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn midpoint(&self) -> f64 {
        self.low + (self.high - self.low) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// True when zero lies inside the closed interval.
    pub fn contains_zero(&self) -> bool {
        self.contains(0.0)
    }

    fn distribution(&self, name: &'static str) -> Result<Uniform<f64>> {
        Uniform::new_inclusive(self.low, self.high).map_err(|_| Error::InvalidRange {
            name,
            low: self.low,
            high: self.high,
            reason: "not a valid uniform distribution",
        })
    }
}

impl std::fmt::Display for UniformRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Parses `LOW:HIGH` (a comma also works as separator).
impl FromStr for UniformRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (low, high) = s
            .split_once([':', ','])
            .ok_or_else(|| format!("expected LOW:HIGH, got '{s}'"))?;
        let low: f64 = low
            .trim()
            .parse()
            .map_err(|e| format!("invalid low bound '{low}': {e}"))?;
        let high: f64 = high
            .trim()
            .parse()
            .map_err(|e| format!("invalid high bound '{high}': {e}"))?;
        Self::new("input", low, high).map_err(|e| e.to_string())
    }
}

/// Uniform ranges of the three input voltages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    pub vrh: UniformRange,
    pub vt: UniformRange,
    pub vsupply: UniformRange,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            vrh: UniformRange {
                low: DEFAULT_VRH_RANGE.0,
                high: DEFAULT_VRH_RANGE.1,
            },
            vt: UniformRange {
                low: DEFAULT_VT_RANGE.0,
                high: DEFAULT_VT_RANGE.1,
            },
            vsupply: UniformRange {
                low: DEFAULT_VSUPPLY_RANGE.0,
                high: DEFAULT_VSUPPLY_RANGE.1,
            },
        }
    }
}

impl SamplerConfig {
    /// The supply voltage divides every formula, so its range must exclude 0.
    pub fn validate(&self) -> Result<()> {
        if self.vsupply.contains_zero() {
            return Err(Error::InvalidRange {
                name: "vsupply",
                low: self.vsupply.low,
                high: self.vsupply.high,
                reason: "supply voltage range must exclude zero",
            });
        }
        Ok(())
    }

    /// Inputs at the centre of every range.
    pub fn midpoint_sample(&self) -> InputSample {
        InputSample {
            vrh: self.vrh.midpoint(),
            vt: self.vt.midpoint(),
            vsupply: self.vsupply.midpoint(),
        }
    }
}

/// Draws independent [`InputSample`]s from the configured ranges.
pub struct InputSampler<R> {
    rng: R,
    vrh: Uniform<f64>,
    vt: Uniform<f64>,
    vsupply: Uniform<f64>,
}

impl<R: rand::Rng> InputSampler<R> {
    pub fn new(config: &SamplerConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rng,
            vrh: config.vrh.distribution("vrh")?,
            vt: config.vt.distribution("vt")?,
            vsupply: config.vsupply.distribution("vsupply")?,
        })
    }

    /// One fresh draw of all three voltages.
    pub fn draw(&mut self) -> InputSample {
        InputSample {
            vrh: self.vrh.sample(&mut self.rng),
            vt: self.vt.sample(&mut self.rng),
            vsupply: self.vsupply.sample(&mut self.rng),
        }
    }
}

impl InputSampler<StdRng> {
    /// Sampler seeded from `seed`, or from OS entropy when `None`.
    pub fn with_seed(config: &SamplerConfig, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(config, rng)
    }
}
