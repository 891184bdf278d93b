//! Worst-case bound calculator (exact interval arithmetic)

use serde::{Deserialize, Serialize};

use crate::entities::dimension::{Dimension, Sign};

/// Worst-case analysis results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorstCaseResult {
    /// Minimum possible assembly value
    pub min: f64,

    /// Maximum possible assembly value
    pub max: f64,

    /// Sum of signed nominals
    pub nominal: f64,
}

impl WorstCaseResult {
    /// Width of the worst-case interval
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Calculate the assembly extremes with every dimension at a tolerance limit
pub fn calculate_worst_case(dimensions: &[Dimension]) -> WorstCaseResult {
    let mut min_result = 0.0;
    let mut max_result = 0.0;
    let mut nominal = 0.0;

    for dim in dimensions {
        nominal += dim.signed_nominal();
        match dim.sign {
            Sign::Positive => {
                min_result += dim.lower();
                max_result += dim.upper();
            }
            // Subtracting the smallest value maximizes the chain
            Sign::Negative => {
                min_result -= dim.upper();
                max_result -= dim.lower();
            }
        }
    }

    WorstCaseResult {
        min: min_result,
        max: max_result,
        nominal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_case_two_dimensions() {
        let dims = [
            Dimension::new("A", 10.0, 0.1, 0.1),
            Dimension::new("B", 5.0, 0.05, 0.05).with_sign(Sign::Negative),
        ];

        // min = (10-0.1) - (5+0.05) = 4.85
        // max = (10+0.1) - (5-0.05) = 5.15
        let wc = calculate_worst_case(&dims);
        assert!((wc.nominal - 5.0).abs() < 1e-12);
        assert!((wc.min - 4.85).abs() < 1e-12);
        assert!((wc.max - 5.15).abs() < 1e-12);
    }

    #[test]
    fn test_worst_case_asymmetric_negative() {
        let dims = [
            Dimension::new("A", 20.0, 0.2, 0.0),
            Dimension::new("B", 8.0, 0.3, 0.1).with_sign(Sign::Negative),
        ];

        // min = 20 - 8.3 = 11.7, max = 20.2 - 7.9 = 12.3
        let wc = calculate_worst_case(&dims);
        assert!((wc.min - 11.7).abs() < 1e-12);
        assert!((wc.max - 12.3).abs() < 1e-12);
        assert!((wc.range() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_worst_case_zero_tolerance_collapses() {
        let dims = [
            Dimension::new("A", 7.0, 0.0, 0.0),
            Dimension::new("B", 2.5, 0.0, 0.0).with_sign(Sign::Negative),
        ];
        let wc = calculate_worst_case(&dims);
        assert_eq!(wc.min, 4.5);
        assert_eq!(wc.max, 4.5);
        assert_eq!(wc.nominal, 4.5);
    }
}
