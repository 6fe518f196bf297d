use std::io::Write;

use sht4x_core::{
    OutputFormat, Result, RunConfig, RunOptions, RunOutcome, benchmark_line, execute,
    render_text, timing_line, write_outputs_csv, write_samples_csv,
};

/// Run against the process stdout.
pub fn run(options: RunOptions) -> Result<()> {
    let stdout = std::io::stdout();
    run_to(options, &mut stdout.lock())
}

/// Validate, compute, write any requested files, then print the report.
///
/// Nothing reaches `out` unless every file write succeeded.
pub fn run_to(options: RunOptions, out: &mut impl Write) -> Result<()> {
    let config = RunConfig::from_options(options)?;
    let outcome = execute(&config)?;
    let report = render_stdout(&config, &outcome)?;

    if let Some(path) = config.csv_output() {
        write_outputs_csv(path, &outcome.outputs)?;
    }
    if let (Some(path), Some(samples)) = (config.samples_output(), outcome.samples.as_ref()) {
        write_samples_csv(path, samples)?;
    }

    out.write_all(report.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Everything destined for stdout, in the configured format.
pub fn render_stdout(config: &RunConfig, outcome: &RunOutcome) -> Result<String> {
    let mut out = match config.format() {
        OutputFormat::Benchmark => {
            return Ok(format!(
                "{}\n",
                benchmark_line(outcome.calibrated_value(), outcome.elapsed)
            ));
        }
        OutputFormat::Json => format!("{}\n", outcome.json_report().to_json_string()?),
        OutputFormat::Text => render_text(&outcome.entries),
    };
    if config.timing() {
        out.push_str(&timing_line(outcome.elapsed));
        out.push('\n');
    }
    Ok(out)
}
