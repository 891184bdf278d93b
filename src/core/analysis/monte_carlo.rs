//! Monte Carlo simulator
//!
//! Every iteration draws one value per dimension, applies its sign and sums
//! the chain. Samples are returned in iteration order; statistics are taken
//! from an independently sorted copy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::histogram::{build_histogram, HistogramBin, DEFAULT_BINS};
use super::sampler::sample_dimension;
use super::{AnalysisError, SpecLimits};
use crate::entities::dimension::Dimension;

/// Iterations used when none is configured
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// How the iterations are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// All iterations on the caller's thread with the injected RNG
    #[default]
    Sequential,
    /// Contiguous chunks on scoped worker threads, each with its own `StdRng`
    /// seeded from the injected RNG. The thread count is capped at the
    /// iteration count and the available parallelism. Reproducible for a fixed
    /// seed and effective thread count.
    Parallel { threads: usize },
}

/// Monte Carlo configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloSettings {
    /// Number of assemblies to simulate
    pub iterations: usize,

    /// Histogram bin count
    pub bins: usize,

    /// Scheduling strategy
    pub execution: Execution,
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            bins: DEFAULT_BINS,
            execution: Execution::Sequential,
        }
    }
}

impl MonteCarloSettings {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.iterations == 0 {
            return Err(AnalysisError::InvalidIterations(self.iterations));
        }
        if self.bins == 0 {
            return Err(AnalysisError::InvalidBinCount(self.bins));
        }
        if let Execution::Parallel { threads: 0 } = self.execution {
            return Err(AnalysisError::InvalidThreadCount);
        }
        Ok(())
    }
}

/// Monte Carlo simulation results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Smallest simulated assembly
    pub min: f64,

    /// Largest simulated assembly
    pub max: f64,

    /// Sample mean
    pub mean: f64,

    /// Population standard deviation (divides by N)
    pub std_dev: f64,

    /// Simulated assemblies in iteration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<f64>,

    /// Distribution of the samples
    pub histogram: Vec<HistogramBin>,

    /// Percentage of assemblies within spec
    pub yield_percent: f64,
}

/// Simulate `count` assemblies, returning the samples and the in-spec count
fn sample_chain<R: Rng + ?Sized>(
    dimensions: &[Dimension],
    limits: SpecLimits,
    default_cpk: f64,
    count: usize,
    rng: &mut R,
) -> (Vec<f64>, usize) {
    let mut samples = Vec::with_capacity(count);
    let mut passed = 0;

    for _ in 0..count {
        let value: f64 = dimensions
            .iter()
            .map(|dim| sample_dimension(dim, default_cpk, rng) * dim.sign.factor())
            .sum();
        if limits.accepts(value) {
            passed += 1;
        }
        samples.push(value);
    }

    (samples, passed)
}

/// Requested thread count capped by the work and the machine
fn effective_threads(requested: usize, iterations: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    requested.min(iterations).min(cores).max(1)
}

/// Split `total` into `parts` contiguous chunk sizes, larger chunks first
fn chunk_sizes(total: usize, parts: usize) -> Vec<usize> {
    let base = total / parts;
    let extra = total % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

fn sample_chain_parallel<R: Rng + ?Sized>(
    dimensions: &[Dimension],
    limits: SpecLimits,
    default_cpk: f64,
    iterations: usize,
    threads: usize,
    rng: &mut R,
) -> Result<(Vec<f64>, usize), AnalysisError> {
    let threads = effective_threads(threads, iterations);
    // Seeds are drawn in chunk order so the run is reproducible
    let chunks: Vec<(u64, usize)> = chunk_sizes(iterations, threads)
        .into_iter()
        .map(|count| (rng.random::<u64>(), count))
        .collect();

    tracing::debug!(threads, iterations, "running parallel Monte Carlo");

    std::thread::scope(|s| {
        let handles = chunks
            .iter()
            .enumerate()
            .map(|(index, &(seed, count))| {
                std::thread::Builder::new()
                    .name(format!("tolstack-mc-{}", index))
                    .spawn_scoped(s, move || {
                        let mut chunk_rng = StdRng::seed_from_u64(seed);
                        sample_chain(dimensions, limits, default_cpk, count, &mut chunk_rng)
                    })
                    .map_err(|e| AnalysisError::ThreadSpawn(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut samples = Vec::with_capacity(iterations);
        let mut passed = 0;
        for handle in handles {
            let (chunk, chunk_passed) = handle.join().map_err(|_| AnalysisError::WorkerPanicked)?;
            samples.extend(chunk);
            passed += chunk_passed;
        }
        Ok((samples, passed))
    })
}

/// Run the Monte Carlo simulation of a dimension chain
pub fn run_monte_carlo<R: Rng + ?Sized>(
    dimensions: &[Dimension],
    limits: SpecLimits,
    default_cpk: f64,
    settings: &MonteCarloSettings,
    rng: &mut R,
) -> Result<MonteCarloResult, AnalysisError> {
    settings.validate()?;
    if dimensions.is_empty() {
        return Err(AnalysisError::EmptyChain);
    }

    let (samples, passed) = match settings.execution {
        Execution::Sequential => {
            sample_chain(dimensions, limits, default_cpk, settings.iterations, rng)
        }
        Execution::Parallel { threads } => sample_chain_parallel(
            dimensions,
            limits,
            default_cpk,
            settings.iterations,
            threads,
            rng,
        )?,
    };

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let min = sorted.first().copied().unwrap_or(mean);
    let max = sorted.last().copied().unwrap_or(mean);

    let histogram = build_histogram(&sorted, min, max, settings.bins);
    let yield_percent = passed as f64 / n * 100.0;

    Ok(MonteCarloResult {
        min,
        max,
        mean,
        std_dev,
        samples,
        histogram,
        yield_percent,
    })
}
