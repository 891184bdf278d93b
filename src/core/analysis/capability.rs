//! Assembly capability summary from the Monte Carlo distribution

use serde::{Deserialize, Serialize};

use super::monte_carlo::MonteCarloResult;
use super::rss::RssResult;
use super::SpecLimits;

/// Capability index above which a process is considered capable
pub const CAPABLE_CPK: f64 = 1.33;

/// Capability index above which a process is considered marginal
pub const MARGINAL_CPK: f64 = 1.0;

/// Qualitative reading of a Cpk value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRating {
    /// Cpk > 1.33
    Capable,
    /// 1.0 < Cpk <= 1.33
    Marginal,
    /// Cpk <= 1.0
    NotCapable,
}

impl CapabilityRating {
    pub fn from_cpk(cpk: f64) -> Self {
        if cpk > CAPABLE_CPK {
            CapabilityRating::Capable
        } else if cpk > MARGINAL_CPK {
            CapabilityRating::Marginal
        } else {
            CapabilityRating::NotCapable
        }
    }
}

impl std::fmt::Display for CapabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityRating::Capable => write!(f, "capable"),
            CapabilityRating::Marginal => write!(f, "marginal"),
            CapabilityRating::NotCapable => write!(f, "not capable"),
        }
    }
}

/// Capability indices of the simulated assembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySummary {
    /// Cp = (USL - LSL) / 6s; needs both limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<f64>,

    /// Cpk = min(USL - μ, μ - LSL) / 3s over the defined limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpk: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<CapabilityRating>,

    /// Percentage of assemblies out of spec (100 - yield)
    pub interference_percent: f64,
}

impl CapabilitySummary {
    /// Derive indices from the Monte Carlo mean and standard deviation
    ///
    /// Indices are `None` without spec limits or with zero spread.
    pub fn from_monte_carlo(mc: &MonteCarloResult, limits: SpecLimits) -> Self {
        let s = mc.std_dev;
        let spread_known = s > 0.0 && s.is_finite();

        let cp = match limits.both() {
            Some((usl, lsl)) if spread_known => Some((usl - lsl) / (6.0 * s)),
            _ => None,
        };

        let cpu = limits.upper.map(|usl| (usl - mc.mean) / (3.0 * s));
        let cpl = limits.lower.map(|lsl| (mc.mean - lsl) / (3.0 * s));
        let cpk = match (cpu, cpl) {
            _ if !spread_known => None,
            (Some(u), Some(l)) => Some(u.min(l)),
            (Some(u), None) => Some(u),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        };

        Self {
            cp,
            cpk,
            rating: cpk.map(CapabilityRating::from_cpk),
            interference_percent: 100.0 - mc.yield_percent,
        }
    }
}

/// Suggest spec limits from the RSS natural limits (±3σ), rounded to 0.01
///
/// Returns `(upper, lower)`, the same order as [`SpecLimits::new`](super::SpecLimits::new).
pub fn suggest_limits(rss: &RssResult) -> (f64, f64) {
    let round2 = |v: f64| (v * 100.0).round() / 100.0;
    (round2(rss.max), round2(rss.min))
}
