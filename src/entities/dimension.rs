//! Dimension entity - one signed link in a tolerance chain
//!
//! A dimension carries a nominal value, an asymmetric tolerance band, the
//! statistical distribution used when simulating it, and an optional process
//! capability index.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::core::analysis::AnalysisError;
use crate::entities::process::ProcessCapability;

/// Capability index assumed when a dimension does not specify one.
///
/// Used by both the RSS and the Monte Carlo passes.
pub const DEFAULT_CPK: f64 = 1.33;

/// Prefix for generated dimension IDs
pub const DIMENSION_ID_PREFIX: &str = "DIM";

/// Direction of a dimension in the chain
///
/// Serialized as the integers `1` and `-1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Sign {
    /// Adds to the chain
    #[default]
    Positive,
    /// Subtracts from the chain (closes the loop / gap)
    Negative,
}

impl Sign {
    /// Numeric factor (+1.0 or -1.0)
    pub fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

impl TryFrom<i8> for Sign {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Sign::Positive),
            -1 => Ok(Sign::Negative),
            other => Err(format!("sign must be 1 or -1, got {}", other)),
        }
    }
}

impl From<Sign> for i8 {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::Positive => write!(f, "+"),
            Sign::Negative => write!(f, "-"),
        }
    }
}

/// Statistical distribution used for Monte Carlo sampling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Normal (Gaussian), spread derived from the tolerance band and cpk
    #[default]
    #[serde(alias = "Normal")]
    Normal,
    /// Uniform over the whole tolerance band
    #[serde(alias = "Uniform")]
    Uniform,
    /// Sum of two uniforms across the band
    #[serde(alias = "Trapezoidal")]
    Trapezoidal,
    /// Two-point distribution at the tolerance extremes
    #[serde(alias = "Bernoulli")]
    Bernoulli,
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Normal => write!(f, "normal"),
            Distribution::Uniform => write!(f, "uniform"),
            Distribution::Trapezoidal => write!(f, "trapezoidal"),
            Distribution::Bernoulli => write!(f, "bernoulli"),
        }
    }
}

/// Geometric classification of a dimension (not used by the numeric core)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionType {
    #[default]
    #[serde(alias = "Linear")]
    Linear,
    #[serde(alias = "Hole")]
    Hole,
    #[serde(alias = "Shaft")]
    Shaft,
    #[serde(alias = "Radial")]
    Radial,
}

impl std::fmt::Display for DimensionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionType::Linear => write!(f, "linear"),
            DimensionType::Hole => write!(f, "hole"),
            DimensionType::Shaft => write!(f, "shaft"),
            DimensionType::Radial => write!(f, "radial"),
        }
    }
}

/// One link of the tolerance chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Caller-owned identifier
    pub id: String,

    /// Display label
    pub name: String,

    /// Design value
    pub nominal: f64,

    /// Allowed positive deviation (non-negative)
    #[serde(alias = "tolPlus")]
    pub tol_plus: f64,

    /// Allowed negative deviation (non-negative)
    #[serde(alias = "tolMinus")]
    pub tol_minus: f64,

    /// Direction in the chain
    #[serde(default)]
    pub sign: Sign,

    /// Distribution for Monte Carlo
    #[serde(default)]
    pub distribution: Distribution,

    /// Process capability index; `None` uses the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpk: Option<f64>,

    /// Classification tag
    #[serde(rename = "type", default)]
    pub dim_type: DimensionType,

    /// Name of a process table entry the tolerances were taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
}

impl Dimension {
    /// Create a positive, normally distributed dimension with a generated ID
    pub fn new(name: impl Into<String>, nominal: f64, tol_plus: f64, tol_minus: f64) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            nominal,
            tol_plus,
            tol_minus,
            sign: Sign::Positive,
            distribution: Distribution::Normal,
            cpk: None,
            dim_type: DimensionType::Linear,
            process: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_sign(mut self, sign: Sign) -> Self {
        self.sign = sign;
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn with_cpk(mut self, cpk: f64) -> Self {
        self.cpk = Some(cpk);
        self
    }

    pub fn with_type(mut self, dim_type: DimensionType) -> Self {
        self.dim_type = dim_type;
        self
    }

    /// Total tolerance band (plus + minus)
    pub fn tolerance_band(&self) -> f64 {
        self.tol_plus + self.tol_minus
    }

    /// Signed nominal contribution to the chain
    pub fn signed_nominal(&self) -> f64 {
        self.nominal * self.sign.factor()
    }

    /// Largest value the dimension may take
    pub fn upper(&self) -> f64 {
        self.nominal + self.tol_plus
    }

    /// Smallest value the dimension may take
    pub fn lower(&self) -> f64 {
        self.nominal - self.tol_minus
    }

    /// Center of the tolerance band (differs from nominal for asymmetric bands)
    pub fn band_center(&self) -> f64 {
        self.nominal + (self.tol_plus - self.tol_minus) / 2.0
    }

    /// Capability index, falling back to `default_cpk` when unset
    pub fn cpk_or(&self, default_cpk: f64) -> f64 {
        self.cpk.unwrap_or(default_cpk)
    }

    /// Fill tolerances and capability from a process table entry
    pub fn apply_process(&mut self, process: &ProcessCapability) {
        self.tol_plus = process.typical_tol;
        self.tol_minus = process.typical_tol;
        self.cpk = Some(process.min_cpk);
        self.distribution = Distribution::Normal;
        self.process = Some(process.process.to_string());
    }

    /// Check the numeric invariants of this dimension
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |reason: String| AnalysisError::InvalidInput {
            dimension: self.name.clone(),
            reason,
        };

        if !self.nominal.is_finite() {
            return Err(invalid(format!("nominal must be finite, got {}", self.nominal)));
        }
        if !self.tol_plus.is_finite() || self.tol_plus < 0.0 {
            return Err(invalid(format!(
                "plus tolerance must be a finite non-negative number, got {}",
                self.tol_plus
            )));
        }
        if !self.tol_minus.is_finite() || self.tol_minus < 0.0 {
            return Err(invalid(format!(
                "minus tolerance must be a finite non-negative number, got {}",
                self.tol_minus
            )));
        }
        if let Some(cpk) = self.cpk {
            if !cpk.is_finite() || cpk <= 0.0 {
                return Err(invalid(format!(
                    "cpk must be a finite positive number, got {}",
                    cpk
                )));
            }
        }

        Ok(())
    }
}

/// Generate a new dimension ID (`DIM-<ULID>`)
pub fn generate_id() -> String {
    format!("{}-{}", DIMENSION_ID_PREFIX, Ulid::new())
}
