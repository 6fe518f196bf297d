//! Result reporting: text, JSON, CSV, benchmark line and sample export.
//!
//! Text reports carry eight tail-probability statements per output. They
//! are answered by whatever [`TailProbability`] the run provides: the
//! uncertainty backend in distributional mode, or the empirical sample
//! fractions in Monte Carlo mode, so both modes print the same layout.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::calibration::{CalibratedOutputs, OutputChannel, OutputSelector};
use crate::error::{Error, Result};
use crate::montecarlo::SampleBuffer;
use crate::uncertainty::TailProbability;

/// Relative deviations queried on each side of the reported value.
pub const TAIL_FRACTIONS: [f64; 4] = [0.05, 0.50, 1.00, 2.00];

/// Title of the JSON record.
pub const JSON_DESCRIPTION: &str = "SHT4xARP Sensor Calibration Use Case";

// ---------------------------------------------------------------------------
// Tail statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TailDirection {
    Smaller,
    Greater,
}

impl std::fmt::Display for TailDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Smaller => write!(f, "smaller"),
            Self::Greater => write!(f, "greater"),
        }
    }
}

/// "Probability that the output is `fraction` or more smaller/greater than
/// `reference`."
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TailStatement {
    pub direction: TailDirection,
    pub fraction: f64,
    pub reference: f64,
    pub threshold: f64,
    pub probability: f64,
}

/// The four "smaller" statements followed by the four "greater" ones.
///
/// Smaller: `1 - P(X > v(1 - p))`. Greater: `P(X > v(1 + p))`.
pub fn tail_statements(reference: f64, distribution: &impl TailProbability) -> Vec<TailStatement> {
    let smaller = TAIL_FRACTIONS.iter().map(|&fraction| {
        let threshold = reference * (1.0 - fraction);
        TailStatement {
            direction: TailDirection::Smaller,
            fraction,
            reference,
            threshold,
            probability: 1.0 - distribution.probability_greater_than(threshold),
        }
    });
    let greater = TAIL_FRACTIONS.iter().map(|&fraction| {
        let threshold = reference * (1.0 + fraction);
        TailStatement {
            direction: TailDirection::Greater,
            fraction,
            reference,
            threshold,
            probability: distribution.probability_greater_than(threshold),
        }
    });
    smaller.chain(greater).collect()
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

/// One output's block in the text report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub channel: OutputChannel,
    pub value: f64,
    pub tails: Vec<TailStatement>,
}

impl ReportEntry {
    pub fn new(channel: OutputChannel, value: f64, distribution: &impl TailProbability) -> Self {
        Self {
            channel,
            value,
            tails: tail_statements(value, distribution),
        }
    }
}

/// Render entries as the human-readable report.
pub fn render_text(entries: &[ReportEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{}: {:.2} {}.\n",
            entry.channel.description(),
            entry.value,
            entry.channel.unit()
        ));
        let mut previous = None;
        for tail in &entry.tails {
            if previous != Some(tail.direction) {
                out.push('\n');
                previous = Some(tail.direction);
            }
            out.push_str(&format!(
                "\tProbability that calibrated sensor output is {:>3}% or more {} than {:.2}, is {:.6}\n",
                (tail.fraction * 100.0).round() as u32,
                tail.direction,
                tail.reference,
                tail.probability
            ));
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// JSON record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonValues {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub array: Vec<f64>,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonVariable {
    pub variable_symbol: String,
    pub variable_description: &'static str,
    pub values: JsonValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonReport {
    pub description: &'static str,
    pub variables: Vec<JsonVariable>,
}

impl JsonReport {
    /// Build the record for `selector`.
    ///
    /// With a sample buffer (Monte Carlo) each selected variable carries the
    /// full buffer; otherwise it carries its single calibrated value.
    pub fn new(
        selector: OutputSelector,
        outputs: &CalibratedOutputs,
        samples: Option<&SampleBuffer>,
    ) -> Self {
        let variables = selector
            .channels()
            .iter()
            .filter_map(|&channel| {
                let array = match samples {
                    Some(buffer) => buffer.as_slice().to_vec(),
                    None => vec![outputs.get(channel)?],
                };
                Some(JsonVariable {
                    variable_symbol: format!("outputDistributions[{}]", channel.index()),
                    variable_description: channel.description(),
                    values: JsonValues {
                        kind: "double",
                        size: array.len(),
                        array,
                    },
                })
            })
            .collect();
        Self {
            description: JSON_DESCRIPTION,
            variables,
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Files and benchmark line
// ---------------------------------------------------------------------------

/// Write populated outputs as CSV: one header row of variable descriptions,
/// one row of values.
pub fn write_outputs_csv(path: &Path, outputs: &CalibratedOutputs) -> Result<()> {
    let write = || -> csv::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(outputs.iter().map(|(channel, _)| channel.description()))?;
        writer.write_record(outputs.iter().map(|(_, value)| value.to_string()))?;
        writer.flush()?;
        Ok(())
    };
    write().map_err(|source| output_error(path, source))?;
    log::debug!("wrote {} output(s) to {}", outputs.len(), path.display());
    Ok(())
}

fn output_error(path: &Path, source: csv::Error) -> Error {
    Error::Output {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Serialize)]
struct SampleRow {
    iteration: usize,
    value: f64,
}

/// Export the Monte Carlo buffer as `iteration,value` rows in iteration order.
pub fn write_samples_csv(path: &Path, samples: &SampleBuffer) -> Result<()> {
    let write = || -> csv::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (iteration, &value) in samples.iter().enumerate() {
            writer.serialize(SampleRow { iteration, value })?;
        }
        writer.flush()?;
        Ok(())
    };
    write().map_err(|source| output_error(path, source))?;
    log::debug!("wrote {} sample(s) to {}", samples.len(), path.display());
    Ok(())
}

/// `"<value with 6 decimals> <elapsed whole microseconds>"`.
pub fn benchmark_line(value: f64, elapsed: Duration) -> String {
    format!("{value:.6} {}", elapsed.as_micros() as u64)
}

/// Trailer printed when timing is enabled.
pub fn timing_line(elapsed: Duration) -> String {
    format!("\nCPU time used: {:.6} seconds", elapsed.as_secs_f64())
}
