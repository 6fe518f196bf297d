//! Run configuration.
//!
//! [`RunOptions`] carries what the user asked for, unvalidated.
//! [`RunConfig::from_options`] enforces every mode interaction up front and
//! yields the immutable [`RunConfig`] that the runner and reporter read.
//! Nothing is computed for a configuration that fails validation.

use std::path::PathBuf;

use crate::calibration::OutputSelector;
use crate::error::{Error, Result};
use crate::montecarlo::validate_workers;
use crate::sampler::SamplerConfig;

/// How uncertain inputs are propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One evaluation through an [`UncertaintyBackend`](crate::UncertaintyBackend),
    /// repeated `iterations` times; the last evaluation is reported.
    #[default]
    Distributional,
    /// `iterations` independent samples, aggregated into mean and variance.
    MonteCarlo,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Distributional => write!(f, "distributional"),
            Self::MonteCarlo => write!(f, "Monte Carlo"),
        }
    }
}

/// What gets printed on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Per-output value, unit and tail-probability statements.
    #[default]
    Text,
    /// Structured record of variable symbols, descriptions and values.
    Json,
    /// A single `<value> <microseconds>` line.
    Benchmark,
}

/// Raw user options, one field per command-line flag.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_path: Option<PathBuf>,
    pub input_path: Option<PathBuf>,
    pub select_output: Option<usize>,
    pub iterations: usize,
    pub monte_carlo: bool,
    pub timing: bool,
    pub benchmarking: bool,
    pub json: bool,
    pub sampler: SamplerConfig,
    pub seed: Option<u64>,
    pub workers: usize,
    pub samples_path: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_path: None,
            input_path: None,
            select_output: None,
            iterations: 1,
            monte_carlo: false,
            timing: false,
            benchmarking: false,
            json: false,
            sampler: SamplerConfig::default(),
            seed: None,
            workers: 1,
            samples_path: None,
        }
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    selector: OutputSelector,
    mode: ExecutionMode,
    iterations: usize,
    format: OutputFormat,
    timing: bool,
    csv_output: Option<PathBuf>,
    samples_output: Option<PathBuf>,
    sampler: SamplerConfig,
    seed: Option<u64>,
    workers: usize,
}

impl RunConfig {
    pub fn from_options(options: RunOptions) -> Result<Self> {
        if options.input_path.is_some() {
            return Err(Error::InputFromFileUnsupported);
        }
        if options.output_path.is_some() && options.monte_carlo {
            return Err(Error::FileOutputInMonteCarlo);
        }

        let selector = match options.select_output {
            Some(index) => OutputSelector::from_index(index)?,
            None => OutputSelector::All,
        };
        if selector.is_all() {
            if options.benchmarking {
                return Err(Error::AllOutputsIncompatible {
                    mode: "benchmarking",
                });
            }
            if options.monte_carlo {
                return Err(Error::AllOutputsIncompatible { mode: "Monte Carlo" });
            }
        }

        if options.iterations == 0 {
            return Err(Error::ZeroIterations);
        }
        validate_workers(options.workers)?;
        options.sampler.validate()?;

        let mode = if options.monte_carlo {
            ExecutionMode::MonteCarlo
        } else {
            ExecutionMode::Distributional
        };
        if options.samples_path.is_some() && mode != ExecutionMode::MonteCarlo {
            log::warn!("--samples-out only applies in Monte Carlo mode; ignoring it");
        }
        if options.workers > 1 && mode != ExecutionMode::MonteCarlo {
            log::warn!("worker threads only apply in Monte Carlo mode; running single-threaded");
        }

        let format = if options.benchmarking {
            OutputFormat::Benchmark
        } else if options.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        if options.output_path.is_some() && format == OutputFormat::Benchmark {
            log::warn!("no output file is written in benchmarking mode; ignoring --output");
        }

        Ok(Self {
            selector,
            mode,
            iterations: options.iterations,
            format,
            timing: options.timing,
            csv_output: options
                .output_path
                .filter(|_| format != OutputFormat::Benchmark),
            samples_output: options
                .samples_path
                .filter(|_| mode == ExecutionMode::MonteCarlo),
            sampler: options.sampler,
            seed: options.seed,
            workers: options.workers,
        })
    }

    pub fn selector(&self) -> OutputSelector {
        self.selector
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether the elapsed time is printed after the report.
    pub fn timing(&self) -> bool {
        self.timing && self.format != OutputFormat::Benchmark
    }

    /// Whether the run is timed at all.
    pub fn is_timed(&self) -> bool {
        self.timing || self.format == OutputFormat::Benchmark
    }

    pub fn csv_output(&self) -> Option<&std::path::Path> {
        self.csv_output.as_deref()
    }

    pub fn samples_output(&self) -> Option<&std::path::Path> {
        self.samples_output.as_deref()
    }

    pub fn sampler(&self) -> &SamplerConfig {
        &self.sampler
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::OutputChannel;
    use crate::sampler::UniformRange;

    fn monte_carlo(select: Option<usize>) -> RunOptions {
        RunOptions {
            monte_carlo: true,
            iterations: 1000,
            select_output: select,
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_defaults_select_all_distributional_text() {
        let config = RunConfig::from_options(RunOptions::default()).unwrap();
        assert_eq!(config.selector(), OutputSelector::All);
        assert_eq!(config.mode(), ExecutionMode::Distributional);
        assert_eq!(config.format(), OutputFormat::Text);
        assert_eq!(config.iterations(), 1);
        assert!(!config.is_timed());
    }

    #[test]
    fn test_all_outputs_with_benchmarking_rejected() {
        let options = RunOptions {
            benchmarking: true,
            ..RunOptions::default()
        };
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::AllOutputsIncompatible {
                mode: "benchmarking"
            })
        ));

        let options = RunOptions {
            benchmarking: true,
            select_output: Some(OutputSelector::ALL_INDEX),
            ..RunOptions::default()
        };
        assert!(RunConfig::from_options(options).is_err());
    }

    #[test]
    fn test_all_outputs_with_monte_carlo_rejected() {
        assert!(matches!(
            RunConfig::from_options(monte_carlo(None)),
            Err(Error::AllOutputsIncompatible { mode: "Monte Carlo" })
        ));
        assert!(RunConfig::from_options(monte_carlo(Some(3))).is_err());
    }

    #[test]
    fn test_file_output_with_monte_carlo_rejected() {
        let options = RunOptions {
            output_path: Some(PathBuf::from("out.csv")),
            ..monte_carlo(Some(0))
        };
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::FileOutputInMonteCarlo)
        ));
    }

    #[test]
    fn test_file_input_always_rejected() {
        for options in [RunOptions::default(), monte_carlo(Some(0))] {
            let options = RunOptions {
                input_path: Some(PathBuf::from("inputs.csv")),
                ..options
            };
            let err = RunConfig::from_options(options).unwrap_err();
            assert!(matches!(err, Error::InputFromFileUnsupported));
            assert!(err.is_config_error());
        }
    }

    #[test]
    fn test_selector_out_of_range_rejected() {
        let options = RunOptions {
            select_output: Some(4),
            ..RunOptions::default()
        };
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::SelectorOutOfRange { provided: 4, .. })
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let options = RunOptions {
            iterations: 0,
            ..monte_carlo(Some(1))
        };
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::ZeroIterations)
        ));
    }

    #[test]
    fn test_bad_supply_range_rejected() {
        let mut options = monte_carlo(Some(1));
        options.sampler.vsupply = UniformRange::new("vsupply", -0.5, 0.5).unwrap();
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_valid_monte_carlo() {
        let options = RunOptions {
            workers: 4,
            samples_path: Some(PathBuf::from("samples.csv")),
            seed: Some(5),
            ..monte_carlo(Some(1))
        };
        let config = RunConfig::from_options(options).unwrap();
        assert_eq!(config.mode(), ExecutionMode::MonteCarlo);
        assert_eq!(
            config.selector(),
            OutputSelector::Single(OutputChannel::TemperatureCelsius)
        );
        assert_eq!(config.iterations(), 1000);
        assert_eq!(config.workers(), 4);
        assert_eq!(config.seed(), Some(5));
        assert!(config.samples_output().is_some());
        assert!(config.csv_output().is_none());
    }

    #[test]
    fn test_samples_path_dropped_outside_monte_carlo() {
        let options = RunOptions {
            samples_path: Some(PathBuf::from("samples.csv")),
            ..RunOptions::default()
        };
        let config = RunConfig::from_options(options).unwrap();
        assert!(config.samples_output().is_none());
    }

    #[test]
    fn test_benchmark_wins_over_json() {
        let options = RunOptions {
            benchmarking: true,
            json: true,
            timing: true,
            select_output: Some(0),
            ..RunOptions::default()
        };
        let config = RunConfig::from_options(options).unwrap();
        assert_eq!(config.format(), OutputFormat::Benchmark);
        assert!(config.is_timed());
        assert!(!config.timing());
    }

    #[test]
    fn test_worker_bounds() {
        let options = RunOptions {
            workers: 0,
            ..monte_carlo(Some(0))
        };
        assert!(matches!(
            RunConfig::from_options(options),
            Err(Error::ZeroWorkers)
        ));

        let options = RunOptions {
            workers: 100_000,
            ..monte_carlo(Some(0))
        };
        let err = RunConfig::from_options(options).unwrap_err();
        assert!(matches!(err, Error::TooManyWorkers { provided: 100_000, .. }));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_no_csv_output_when_benchmarking() {
        let options = RunOptions {
            output_path: Some(PathBuf::from("out.csv")),
            benchmarking: true,
            select_output: Some(2),
            ..RunOptions::default()
        };
        let config = RunConfig::from_options(options).unwrap();
        assert_eq!(config.format(), OutputFormat::Benchmark);
        assert!(config.csv_output().is_none());
    }

    #[test]
    fn test_csv_output_allowed_in_distributional_mode() {
        let options = RunOptions {
            output_path: Some(PathBuf::from("out.csv")),
            ..RunOptions::default()
        };
        let config = RunConfig::from_options(options).unwrap();
        assert_eq!(config.csv_output(), Some(std::path::Path::new("out.csv")));
    }
}
