//! Error types for configuration, sampling, aggregation and output.
//!
//! Every fallible operation in the crate returns [`Result`]. Configuration
//! problems are detected before any computation starts; see
//! [`Error::is_config_error`].

use std::path::PathBuf;

/// Root error type for all sht4x operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Inputs cannot be read from a file; only the built-in uniform
    /// distributions are supported.
    #[error("reading inputs from a file is not currently supported")]
    InputFromFileUnsupported,

    /// `--output` was combined with Monte Carlo mode.
    #[error("writing to an output file is not supported in Monte Carlo mode")]
    FileOutputInMonteCarlo,

    /// The "all outputs" selector was combined with a mode that reports a
    /// single scalar.
    #[error("select a single output when in {mode} mode")]
    AllOutputsIncompatible {
        /// Human-readable name of the conflicting mode.
        mode: &'static str,
    },

    /// Output selector index is past the "all" sentinel.
    #[error("output select value {provided} is out of range (max {max})")]
    SelectorOutOfRange { provided: usize, max: usize },

    #[error("number of iterations must be at least 1")]
    ZeroIterations,

    #[error("number of Monte Carlo workers must be at least 1")]
    ZeroWorkers,

    /// More Monte Carlo workers than [`MAX_WORKERS`](crate::montecarlo::MAX_WORKERS).
    #[error("number of Monte Carlo workers {provided} exceeds the maximum of {max}")]
    TooManyWorkers { provided: usize, max: usize },

    /// A uniform input range is empty, inverted, non-finite, or (for the
    /// supply voltage) contains zero.
    #[error("invalid {name} range [{low}, {high}]: {reason}")]
    InvalidRange {
        name: &'static str,
        low: f64,
        high: f64,
        reason: &'static str,
    },

    /// Aggregation over zero samples is undefined.
    #[error("cannot aggregate an empty sample buffer")]
    EmptySampleBuffer,

    /// The sample buffer could not be allocated.
    #[error("failed to allocate a sample buffer for {iterations} iterations")]
    Allocation { iterations: usize },

    /// The OS refused to start a Monte Carlo worker thread.
    #[error("failed to start Monte Carlo worker {worker}: {source}")]
    WorkerSpawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    /// Writing a CSV output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error stems from user configuration (including
    /// unsupported-feature requests) rather than from the computation or I/O.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InputFromFileUnsupported
                | Self::FileOutputInMonteCarlo
                | Self::AllOutputsIncompatible { .. }
                | Self::SelectorOutOfRange { .. }
                | Self::ZeroIterations
                | Self::ZeroWorkers
                | Self::TooManyWorkers { .. }
                | Self::InvalidRange { .. }
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_classified() {
        assert!(Error::InputFromFileUnsupported.is_config_error());
        assert!(Error::FileOutputInMonteCarlo.is_config_error());
        assert!(Error::ZeroIterations.is_config_error());
        assert!(
            Error::AllOutputsIncompatible {
                mode: "benchmarking"
            }
            .is_config_error()
        );
    }

    #[test]
    fn test_runtime_errors_not_config() {
        assert!(!Error::EmptySampleBuffer.is_config_error());
        assert!(!Error::Allocation { iterations: 10 }.is_config_error());
        let io = std::io::Error::other("disk full");
        assert!(!Error::from(io).is_config_error());
        let spawn = Error::WorkerSpawn {
            worker: 3,
            source: std::io::Error::other("resource temporarily unavailable"),
        };
        assert!(!spawn.is_config_error());
        assert!(Error::TooManyWorkers { provided: 9999, max: 1024 }.is_config_error());
    }

    #[test]
    fn test_output_error_names_the_file() {
        let err = Error::Output {
            path: PathBuf::from("/missing/dir/out.csv"),
            source: csv::Error::from(std::io::Error::other("no such file")),
        };
        let message = err.to_string();
        assert!(message.starts_with("failed to write /missing/dir/out.csv: "));
        assert!(message.contains("no such file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_messages() {
        let err = Error::SelectorOutOfRange {
            provided: 7,
            max: 3,
        };
        assert_eq!(err.to_string(), "output select value 7 is out of range (max 3)");
        let err = Error::AllOutputsIncompatible { mode: "Monte Carlo" };
        assert_eq!(err.to_string(), "select a single output when in Monte Carlo mode");
    }
}
