//! Single-shot execution of a validated [`RunConfig`].
//!
//! Either the whole computation completes and a [`RunOutcome`] is returned,
//! or an error is returned and nothing is reported.

use std::time::{Duration, Instant};

use crate::calibration::{CalibratedOutputs, OutputSelector, calibrate};
use crate::config::{ExecutionMode, RunConfig};
use crate::error::Result;
use crate::montecarlo::{MonteCarloDriver, SampleBuffer};
use crate::report::{JsonReport, ReportEntry};
use crate::stats::MeanAndVariance;
use crate::uncertainty::{
    Distributional, EmpiricalDistribution, PointBackend, UncertaintyBackend, draw_inputs,
};

/// Everything a reporter needs from one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub selector: OutputSelector,
    pub mode: ExecutionMode,
    /// Calibrated values as displayed: the mean per channel under Monte
    /// Carlo, expected values in distributional mode.
    pub outputs: CalibratedOutputs,
    /// Text-report blocks, one per selected channel.
    pub entries: Vec<ReportEntry>,
    /// Monte Carlo sample buffer, in iteration order.
    pub samples: Option<SampleBuffer>,
    pub statistics: Option<MeanAndVariance>,
    /// Time spent sampling, calibrating and aggregating.
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Scalar result: the mean under Monte Carlo, otherwise the value of
    /// the channel evaluated last.
    pub fn calibrated_value(&self) -> f64 {
        self.outputs.calibrated_value()
    }

    pub fn json_report(&self) -> JsonReport {
        JsonReport::new(self.selector, &self.outputs, self.samples.as_ref())
    }
}

/// Execute `config` with the built-in [`PointBackend`] for distributional mode.
pub fn execute(config: &RunConfig) -> Result<RunOutcome> {
    match config.mode() {
        ExecutionMode::MonteCarlo => execute_monte_carlo(config),
        ExecutionMode::Distributional => {
            let mut backend = PointBackend::with_seed(config.seed());
            execute_distributional(config, &mut backend)
        }
    }
}

/// Distributional mode through an arbitrary backend.
///
/// The kernel runs `iterations` times; the last evaluation is reported.
pub fn execute_distributional<B: UncertaintyBackend>(
    config: &RunConfig,
    backend: &mut B,
) -> Result<RunOutcome> {
    let selector = config.selector();
    log::debug!(
        "distributional run: selector {:?}, {} repetition(s)",
        selector,
        config.iterations()
    );

    let t0 = Instant::now();
    let mut outputs = calibrate(&draw_inputs(backend, config.sampler()), selector);
    for _ in 1..config.iterations() {
        outputs = calibrate(&draw_inputs(backend, config.sampler()), selector);
    }
    let elapsed = t0.elapsed();

    let backend: &B = backend;
    let entries = outputs
        .iter()
        .map(|(channel, value)| {
            let value = Distributional::new(backend, value);
            ReportEntry::new(channel, value.expected_value(), &value)
        })
        .collect();

    Ok(RunOutcome {
        selector,
        mode: ExecutionMode::Distributional,
        outputs: outputs.map(|v| backend.expected_value(&v)),
        entries,
        samples: None,
        statistics: None,
        elapsed,
    })
}

fn execute_monte_carlo(config: &RunConfig) -> Result<RunOutcome> {
    let selector = config.selector();
    let driver = MonteCarloDriver::new(selector, *config.sampler())
        .with_seed(config.seed())
        .with_workers(config.workers())?;

    let t0 = Instant::now();
    let (samples, statistics) = driver.run_and_aggregate(config.iterations())?;
    let elapsed = t0.elapsed();

    log::info!(
        "monte carlo: n={} mean={:.6} variance={:.6e}",
        samples.len(),
        statistics.mean,
        statistics.variance
    );

    let channel = selector.last_channel();
    let entries = vec![ReportEntry::new(
        channel,
        statistics.mean,
        &EmpiricalDistribution::new(samples.as_slice()),
    )];

    Ok(RunOutcome {
        selector,
        mode: ExecutionMode::MonteCarlo,
        outputs: CalibratedOutputs::single(channel, statistics.mean),
        entries,
        samples: Some(samples),
        statistics: Some(statistics),
        elapsed,
    })
}
