//! # sht4x-core
//!
//! **Calibrated humidity and temperature from an SHT4xI-analog sensor, with
//! the input uncertainty carried through to the result.**
//!
//! The sensor reports two ratiometric voltages (humidity and temperature)
//! relative to its supply voltage. Each of the three voltages is uncertain
//! and modelled as a uniform distribution. This crate maps them through the
//! datasheet calibration lines and reports the result together with
//! tail-probability statements.
//!
//! ## Quick Start
//!
//! ```
//! use sht4x_core::{MonteCarloDriver, OutputChannel, OutputSelector, SamplerConfig};
//!
//! let driver = MonteCarloDriver::new(
//!     OutputSelector::Single(OutputChannel::RelativeHumidity),
//!     SamplerConfig::default(),
//! )
//! .with_seed(Some(42));
//!
//! let (samples, stats) = driver.run_and_aggregate(10_000).unwrap();
//! assert_eq!(samples.len(), 10_000);
//! assert!((stats.mean - 48.8).abs() < 0.5);
//! ```
//!
//! ## Architecture
//!
//! Sampler → Calibration → Sample buffer → Aggregator → Reporter
//!
//! Two execution modes:
//! - **Distributional** (default): one evaluation through an
//!   [`UncertaintyBackend`]. Backends that propagate whole distributions are
//!   external; [`PointBackend`] is the no-tracking fallback.
//! - **Monte Carlo**: many independent draws, aggregated with a numerically
//!   stable mean/variance; tail probabilities come from the samples.

pub mod calibration;
pub mod config;
pub mod error;
pub mod montecarlo;
pub mod report;
pub mod run;
pub mod sampler;
pub mod stats;
pub mod uncertainty;

pub use calibration::{
    CALIBRATION_C1, CALIBRATION_C2, CALIBRATION_C3, CALIBRATION_C4, CALIBRATION_C5,
    CALIBRATION_C6, Calibratable, CalibratedOutputs, InputSample, OutputChannel, OutputSelector,
    calibrate,
};
pub use config::{ExecutionMode, OutputFormat, RunConfig, RunOptions};
pub use error::{Error, Result};
pub use montecarlo::{MonteCarloDriver, SampleBuffer};
pub use report::{
    JsonReport, ReportEntry, TailDirection, TailStatement, benchmark_line, render_text,
    tail_statements, timing_line, write_outputs_csv, write_samples_csv,
};
pub use run::{RunOutcome, execute, execute_distributional};
pub use sampler::{InputSampler, SamplerConfig, UniformRange};
pub use stats::{MeanAndVariance, RunningStats, VarianceKind, mean_and_variance};
pub use uncertainty::{
    Distributional, EmpiricalDistribution, PointBackend, TailProbability, UncertaintyBackend,
};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
