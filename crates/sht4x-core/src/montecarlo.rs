//! Monte Carlo driver.
//!
//! Architecture:
//! 1. Allocate a [`SampleBuffer`] sized once to the iteration count
//! 2. Per iteration: draw a fresh [`InputSample`](crate::InputSample), calibrate,
//!    store the scalar calibrated value in slot `i`
//! 3. Hand the full buffer to the aggregator
//!
//! Iterations share no state, so with more than one worker the buffer is
//! split into disjoint contiguous chunks and filled by scoped threads, each
//! owning its own RNG. Joining the scope is the only synchronisation.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::calibration::{OutputSelector, calibrate};
use crate::error::{Error, Result};
use crate::sampler::{InputSampler, SamplerConfig};
use crate::stats::{MeanAndVariance, mean_and_variance};

/// Upper bound on Monte Carlo worker threads.
pub const MAX_WORKERS: usize = 1024;

/// Reject worker counts outside `1..=MAX_WORKERS`.
pub fn validate_workers(workers: usize) -> Result<()> {
    match workers {
        0 => Err(Error::ZeroWorkers),
        n if n > MAX_WORKERS => Err(Error::TooManyWorkers {
            provided: n,
            max: MAX_WORKERS,
        }),
        _ => Ok(()),
    }
}

/// One calibrated scalar per Monte Carlo iteration, in iteration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f64>,
}

impl SampleBuffer {
    /// Zero-filled buffer of exactly `len` slots.
    ///
    /// Allocation failure is reported instead of aborting.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut samples = Vec::new();
        samples
            .try_reserve_exact(len)
            .map_err(|_| Error::Allocation { iterations: len })?;
        samples.resize(len, 0.0);
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.samples.iter()
    }

    /// Population mean and variance of the buffer.
    pub fn mean_and_variance(&self) -> Result<MeanAndVariance> {
        mean_and_variance(&self.samples)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.samples
    }
}

impl From<Vec<f64>> for SampleBuffer {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

impl AsRef<[f64]> for SampleBuffer {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}

/// Runs the sampler and calibration kernel for a fixed number of iterations.
#[derive(Debug, Clone)]
pub struct MonteCarloDriver {
    selector: OutputSelector,
    sampler: SamplerConfig,
    seed: Option<u64>,
    workers: usize,
}

impl MonteCarloDriver {
    pub fn new(selector: OutputSelector, sampler: SamplerConfig) -> Self {
        Self {
            selector,
            sampler,
            seed: None,
            workers: 1,
        }
    }

    /// Deterministic sampling. Worker `w` uses `seed + w`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Number of worker threads, between 1 and [`MAX_WORKERS`].
    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        validate_workers(workers)?;
        self.workers = workers;
        Ok(self)
    }

    pub fn selector(&self) -> OutputSelector {
        self.selector
    }

    /// Run `iterations` independent draws.
    ///
    /// The returned buffer always has exactly `iterations` entries; zero
    /// iterations yields an empty buffer.
    pub fn run(&self, iterations: usize) -> Result<SampleBuffer> {
        self.sampler.validate()?;
        let mut buffer = SampleBuffer::zeroed(iterations)?;
        if iterations == 0 {
            log::warn!("monte carlo run requested with zero iterations");
            return Ok(buffer);
        }

        let workers = self.workers.min(iterations);
        log::debug!(
            "monte carlo: {iterations} iterations, {workers} worker(s), selector {:?}",
            self.selector
        );
        let t0 = Instant::now();

        if workers == 1 {
            self.fill(&mut buffer.samples, 0)?;
        } else {
            let chunk_len = iterations.div_ceil(workers);
            std::thread::scope(|s| -> Result<()> {
                let mut handles = Vec::with_capacity(workers);
                for (worker, chunk) in buffer.samples.chunks_mut(chunk_len).enumerate() {
                    // Threads already started are joined when the scope ends.
                    let handle = std::thread::Builder::new()
                        .name(format!("sht4x-mc-{worker}"))
                        .spawn_scoped(s, move || self.fill(chunk, worker as u64))
                        .map_err(|source| Error::WorkerSpawn { worker, source })?;
                    handles.push(handle);
                }
                for handle in handles {
                    match handle.join() {
                        Ok(result) => result?,
                        Err(panic) => std::panic::resume_unwind(panic),
                    }
                }
                Ok(())
            })?;
        }

        log::debug!("monte carlo: filled buffer in {:?}", t0.elapsed());
        Ok(buffer)
    }

    /// Run and aggregate in one step.
    pub fn run_and_aggregate(&self, iterations: usize) -> Result<(SampleBuffer, MeanAndVariance)> {
        let buffer = self.run(iterations)?;
        let stats = buffer.mean_and_variance()?;
        Ok((buffer, stats))
    }

    fn fill(&self, slots: &mut [f64], worker: u64) -> Result<()> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker)),
            None => StdRng::from_os_rng(),
        };
        let mut sampler = InputSampler::new(&self.sampler, rng)?;
        for slot in slots.iter_mut() {
            let inputs = sampler.draw();
            *slot = calibrate(&inputs, self.selector).calibrated_value();
        }
        Ok(())
    }
}
