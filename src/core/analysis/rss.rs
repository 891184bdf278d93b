//! RSS (root-sum-square) bound calculator
//!
//! Each dimension's tolerance band is read as ±3σ scaled by its capability
//! index: `σ_i = avg_tol / (3 · cpk_i)`. Dimensions are assumed independent,
//! so `σ_asm = sqrt(Σ σ_i²)`. The sum is scaled by the largest σ_i so very
//! small tolerances do not underflow to zero.

use serde::{Deserialize, Serialize};

use crate::entities::dimension::Dimension;

/// RSS statistical analysis results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RssResult {
    /// nominal - 3σ
    pub min: f64,

    /// nominal + 3σ
    pub max: f64,

    /// Sum of signed nominals
    pub nominal: f64,

    /// Assembly standard deviation
    pub sigma: f64,
}

/// RSS result plus the per-dimension sigmas it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct RssBreakdown {
    pub result: RssResult,

    /// σ_i per dimension, in chain order
    pub sigmas: Vec<f64>,
}

impl RssBreakdown {
    /// Σ σ_i²
    pub fn total_variance(&self) -> f64 {
        self.sigmas.iter().map(|s| s * s).sum()
    }
}

/// `sqrt(Σ σ_i²)` computed relative to the largest term
pub fn root_sum_square(sigmas: &[f64]) -> f64 {
    let scale = sigmas.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let scaled: f64 = sigmas.iter().map(|s| (s / scale).powi(2)).sum();
    scale * scaled.sqrt()
}

/// Standard deviation implied by a dimension's tolerance band and cpk
pub fn dimension_sigma(dim: &Dimension, default_cpk: f64) -> f64 {
    let avg_tol = dim.tolerance_band() / 2.0;
    avg_tol / (3.0 * dim.cpk_or(default_cpk))
}

/// Calculate the RSS bound of a chain
pub fn calculate_rss(dimensions: &[Dimension], default_cpk: f64) -> RssBreakdown {
    let nominal: f64 = dimensions.iter().map(Dimension::signed_nominal).sum();
    let sigmas: Vec<f64> = dimensions
        .iter()
        .map(|dim| dimension_sigma(dim, default_cpk))
        .collect();
    let sigma = root_sum_square(&sigmas);

    RssBreakdown {
        result: RssResult {
            min: nominal - 3.0 * sigma,
            max: nominal + 3.0 * sigma,
            nominal,
            sigma,
        },
        sigmas,
    }
}
