//! Contribution analyzer - share of assembly variance per dimension

use serde::{Deserialize, Serialize};

use crate::entities::dimension::Dimension;

/// Variance share of one dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub name: String,

    /// σ_i² / Σσ² × 100
    pub percent: f64,
}

/// Rank dimensions by variance share using the RSS sigmas
///
/// `sigmas` must be in chain order (as returned by
/// [`calculate_rss`](super::rss::calculate_rss)). When the total variance is
/// zero every share is zero. Ties keep chain order.
pub fn calculate_contributions(dimensions: &[Dimension], sigmas: &[f64]) -> Vec<Contribution> {
    // Shares are ratios, so work relative to the largest σ to avoid underflow
    let scale = sigmas.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
    let relative = |sigma: &f64| if scale > 0.0 { sigma / scale } else { 0.0 };
    let total_variance: f64 = sigmas.iter().map(|s| relative(s).powi(2)).sum();

    let mut contributions: Vec<Contribution> = dimensions
        .iter()
        .zip(sigmas)
        .map(|(dim, sigma)| Contribution {
            name: dim.name.clone(),
            percent: if total_variance > 0.0 {
                relative(sigma).powi(2) / total_variance * 100.0
            } else {
                0.0
            },
        })
        .collect();

    contributions.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    contributions
}
