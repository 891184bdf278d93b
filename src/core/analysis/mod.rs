//! Stackup analyzer - worst-case, RSS, Monte Carlo and contribution analysis
//!
//! [`analyze`] is a pure function of the dimension chain, the spec limits and
//! an injected random source. Each sub-calculator is also exposed on its own.

pub mod capability;
pub mod contribution;
pub mod histogram;
pub mod monte_carlo;
pub mod rss;
pub mod sampler;
pub mod worst_case;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::dimension::{Dimension, DEFAULT_CPK};
use crate::entities::stackup::StackupConfig;

pub use capability::{suggest_limits, CapabilityRating, CapabilitySummary};
pub use contribution::{calculate_contributions, Contribution};
pub use histogram::{build_histogram, HistogramBin, DEFAULT_BINS};
pub use monte_carlo::{
    run_monte_carlo, Execution, MonteCarloResult, MonteCarloSettings, DEFAULT_ITERATIONS,
};
pub use rss::{calculate_rss, dimension_sigma, RssBreakdown, RssResult};
pub use worst_case::{calculate_worst_case, WorstCaseResult};

/// Errors reported by the analyzer. No partial results are ever returned.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid dimension '{dimension}': {reason}")]
    InvalidInput { dimension: String, reason: String },

    #[error("Stackup has no dimensions. Add dimensions before running analysis.")]
    EmptyChain,

    #[error("Iteration count must be at least 1, got {0}")]
    InvalidIterations(usize),

    #[error("Histogram bin count must be at least 1, got {0}")]
    InvalidBinCount(usize),

    #[error("Thread count must be at least 1 for parallel execution")]
    InvalidThreadCount,

    #[error("Invalid spec limits (upper: {upper:?}, lower: {lower:?}): {reason}")]
    InvalidSpecLimits {
        upper: Option<f64>,
        lower: Option<f64>,
        reason: String,
    },

    #[error("Capability index default must be a finite positive number, got {0}")]
    InvalidDefaultCpk(f64),

    #[error("A Monte Carlo worker thread panicked")]
    WorkerPanicked,

    #[error("Could not start a Monte Carlo worker thread: {0}")]
    ThreadSpawn(String),

    #[error("{stage} analysis overflowed: values in the chain are too large to combine")]
    NumericOverflow { stage: &'static str },
}

/// Fail when any value produced by `stage` is NaN or infinite
fn ensure_finite(stage: &'static str, values: &[f64]) -> Result<(), AnalysisError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        tracing::warn!(stage, "non-finite analysis result");
        Err(AnalysisError::NumericOverflow { stage })
    }
}

/// Upper/lower specification limits; a missing side never fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
}

impl SpecLimits {
    pub fn new(upper: Option<f64>, lower: Option<f64>) -> Self {
        Self { upper, lower }
    }

    /// True when `value` satisfies both limits
    pub fn accepts(&self, value: f64) -> bool {
        self.upper.map_or(true, |usl| value <= usl) && self.lower.map_or(true, |lsl| value >= lsl)
    }

    /// Both limits, when both are defined
    pub fn both(&self) -> Option<(f64, f64)> {
        Some((self.upper?, self.lower?))
    }
}

/// Check that defined limits are finite and ordered
pub fn validate_limits(upper: Option<f64>, lower: Option<f64>) -> Result<(), AnalysisError> {
    let invalid = |reason: &str| AnalysisError::InvalidSpecLimits {
        upper,
        lower,
        reason: reason.to_string(),
    };

    if upper.is_some_and(|v| !v.is_finite()) || lower.is_some_and(|v| !v.is_finite()) {
        return Err(invalid("limits must be finite"));
    }
    if let (Some(usl), Some(lsl)) = (upper, lower) {
        if usl < lsl {
            return Err(invalid("upper limit is below lower limit"));
        }
    }
    Ok(())
}

/// Tunable inputs of a full analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions {
    /// Capability index used for dimensions without one
    pub default_cpk: f64,

    /// Monte Carlo configuration
    pub monte_carlo: MonteCarloSettings,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            default_cpk: DEFAULT_CPK,
            monte_carlo: MonteCarloSettings::default(),
        }
    }
}

impl AnalysisOptions {
    fn validate(&self) -> Result<(), AnalysisError> {
        if !self.default_cpk.is_finite() || self.default_cpk <= 0.0 {
            return Err(AnalysisError::InvalidDefaultCpk(self.default_cpk));
        }
        self.monte_carlo.validate()
    }
}

/// Combined output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub worst_case: WorstCaseResult,
    pub rss: RssResult,
    pub monte_carlo: MonteCarloResult,

    /// Variance share per dimension, descending
    pub contributions: Vec<Contribution>,

    /// Capability indices derived from the Monte Carlo distribution
    pub capability: CapabilitySummary,
}

/// Analyze a stored stackup
pub fn analyze<R: Rng + ?Sized>(
    stackup: &StackupConfig,
    options: &AnalysisOptions,
    rng: &mut R,
) -> Result<SimulationResult, AnalysisError> {
    analyze_chain(
        &stackup.dimensions,
        SpecLimits::new(stackup.upper_spec_limit, stackup.lower_spec_limit),
        options,
        rng,
    )
}

/// Analyze a dimension chain against optional spec limits
pub fn analyze_chain<R: Rng + ?Sized>(
    dimensions: &[Dimension],
    limits: SpecLimits,
    options: &AnalysisOptions,
    rng: &mut R,
) -> Result<SimulationResult, AnalysisError> {
    if dimensions.is_empty() {
        return Err(AnalysisError::EmptyChain);
    }
    for dim in dimensions {
        dim.validate()?;
    }
    validate_limits(limits.upper, limits.lower)?;
    options.validate()?;

    let worst_case = calculate_worst_case(dimensions);
    ensure_finite(
        "Worst-case",
        &[worst_case.min, worst_case.max, worst_case.nominal],
    )?;

    let breakdown = calculate_rss(dimensions, options.default_cpk);
    let rss = &breakdown.result;
    ensure_finite("RSS", &[rss.min, rss.max, rss.nominal, rss.sigma])?;

    let monte_carlo = run_monte_carlo(
        dimensions,
        limits,
        options.default_cpk,
        &options.monte_carlo,
        rng,
    )?;
    ensure_finite(
        "Monte Carlo",
        &[
            monte_carlo.min,
            monte_carlo.max,
            monte_carlo.mean,
            monte_carlo.std_dev,
        ],
    )?;
    let contributions = calculate_contributions(dimensions, &breakdown.sigmas);
    let capability = CapabilitySummary::from_monte_carlo(&monte_carlo, limits);

    tracing::debug!(
        dimensions = dimensions.len(),
        wc_min = worst_case.min,
        wc_max = worst_case.max,
        sigma = breakdown.result.sigma,
        mc_mean = monte_carlo.mean,
        yield_percent = monte_carlo.yield_percent,
        "stackup analysis complete"
    );

    Ok(SimulationResult {
        worst_case,
        rss: breakdown.result,
        monte_carlo,
        contributions,
        capability,
    })
}
