//! CLI for sht4x: SHT4xI-analog sensor calibration under input uncertainty.

mod app;

use std::path::PathBuf;

use clap::Parser;
use sht4x_core::{RunOptions, SamplerConfig, UniformRange};

#[derive(Parser, Debug)]
#[command(name = "sht4x")]
#[command(about = "SHT4xI sensor conversion routines with uncertainty propagation")]
#[command(version = sht4x_core::VERSION)]
struct Cli {
    /// Path to output CSV file (not available in Monte Carlo mode)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Path to an input CSV file (not currently supported)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Compute the 0-indexed output: 0 = relative humidity, 1 = temperature
    /// (Celsius), 2 = temperature (Fahrenheit). 3 computes all outputs
    /// (the default).
    #[arg(short = 'S', long = "select-output")]
    select_output: Option<usize>,

    /// Number of executions: Monte Carlo sample count, or kernel
    /// repetitions for benchmarking otherwise
    #[arg(short = 'M', long = "multiple-executions", default_value = "1")]
    multiple_executions: usize,

    /// Estimate by repeated independent sampling instead of a single
    /// distributional evaluation
    #[arg(long)]
    monte_carlo: bool,

    /// Timing mode: time the kernel and print the elapsed time
    #[arg(short = 'T', long = "time")]
    time: bool,

    /// Benchmarking mode: print only "<value> <microseconds>"
    #[arg(short = 'b', long = "benchmarking")]
    benchmarking: bool,

    /// Print output in JSON format
    #[arg(short = 'j', long = "json")]
    json: bool,

    /// Humidity voltage range in volts, LOW:HIGH
    #[arg(long, value_name = "LOW:HIGH")]
    vrh: Option<UniformRange>,

    /// Temperature voltage range in volts, LOW:HIGH
    #[arg(long, value_name = "LOW:HIGH")]
    vt: Option<UniformRange>,

    /// Supply voltage range in volts, LOW:HIGH (must exclude 0)
    #[arg(long, value_name = "LOW:HIGH")]
    vsupply: Option<UniformRange>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for Monte Carlo sampling
    #[arg(long, default_value = "1")]
    workers: usize,

    /// Export the Monte Carlo samples as CSV (iteration,value)
    #[arg(long, value_name = "PATH")]
    samples_out: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        let defaults = SamplerConfig::default();
        RunOptions {
            output_path: self.output,
            input_path: self.input,
            select_output: self.select_output,
            iterations: self.multiple_executions,
            monte_carlo: self.monte_carlo,
            timing: self.time,
            benchmarking: self.benchmarking,
            json: self.json,
            sampler: SamplerConfig {
                vrh: self.vrh.unwrap_or(defaults.vrh),
                vt: self.vt.unwrap_or(defaults.vt),
                vsupply: self.vsupply.unwrap_or(defaults.vsupply),
            },
            seed: self.seed,
            workers: self.workers,
            samples_path: self.samples_out,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    log::debug!("{cli:?}");

    if let Err(e) = app::run(cli.into_options()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
