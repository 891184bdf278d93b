//! Distribution sampler - one sampling rule per distribution family

use rand::Rng;

use crate::entities::dimension::{Dimension, Distribution};

/// Draw a uniform value in the open interval (0, 1)
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.random();
        if u > 0.0 {
            return u;
        }
    }
}

/// Standard normal variate via the Box-Muller transform
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// Draw one value of a dimension from its distribution
///
/// `default_cpk` applies to Normal dimensions without a capability index.
pub fn sample_dimension<R: Rng + ?Sized>(dim: &Dimension, default_cpk: f64, rng: &mut R) -> f64 {
    let range = dim.tolerance_band();

    match dim.distribution {
        Distribution::Normal => {
            // Band center, so unilateral tolerances stay centered in their zone
            let mean = dim.band_center();
            let sigma = (range / 2.0) / (3.0 * dim.cpk_or(default_cpk));
            mean + standard_normal(rng) * sigma
        }
        Distribution::Uniform => {
            let u: f64 = rng.random();
            dim.lower() + u * range
        }
        Distribution::Trapezoidal => {
            // Sum of two uniforms (Irwin-Hall n=2) stretched over the band
            let r1: f64 = rng.random();
            let r2: f64 = rng.random();
            dim.lower() + (r1 + r2) * (range / 2.0)
        }
        Distribution::Bernoulli => {
            if rng.random_bool(0.5) {
                dim.upper()
            } else {
                dim.lower()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::dimension::DEFAULT_CPK;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn draw(dim: &Dimension, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| sample_dimension(dim, DEFAULT_CPK, &mut rng))
            .collect()
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let values: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let m = mean(&values);
        let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(m.abs() < 0.05, "mean {}", m);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_normal_centers_on_band_center() {
        let dim = Dimension::new("A", 10.0, 0.3, 0.1).with_cpk(1.0);
        let values = draw(&dim, 20_000, 7);
        // center 10.1, σ = 0.2 / 3
        assert!((mean(&values) - 10.1).abs() < 0.005);
    }

    #[test]
    fn test_uniform_stays_in_band() {
        let dim = Dimension::new("A", 5.0, 0.2, 0.1).with_distribution(Distribution::Uniform);
        let values = draw(&dim, 5_000, 11);
        assert!(values.iter().all(|&v| v >= 4.9 - 1e-12 && v <= 5.2 + 1e-12));
        assert!((mean(&values) - 5.05).abs() < 0.01);
    }

    #[test]
    fn test_trapezoidal_stays_in_band() {
        let dim = Dimension::new("A", 5.0, 0.2, 0.2).with_distribution(Distribution::Trapezoidal);
        let values = draw(&dim, 5_000, 13);
        assert!(values.iter().all(|&v| v >= 4.8 - 1e-12 && v <= 5.2 + 1e-12));
        assert!((mean(&values) - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_bernoulli_only_hits_extremes() {
        let dim = Dimension::new("A", 3.0, 0.25, 0.5).with_distribution(Distribution::Bernoulli);
        let values = draw(&dim, 2_000, 17);
        assert!(values.iter().all(|&v| v == 3.25 || v == 2.5));

        let highs = values.iter().filter(|&&v| v == 3.25).count();
        assert!(highs > 800 && highs < 1200, "highs {}", highs);
    }

    #[test]
    fn test_zero_tolerance_is_constant() {
        for distribution in [
            Distribution::Normal,
            Distribution::Uniform,
            Distribution::Trapezoidal,
            Distribution::Bernoulli,
        ] {
            let dim = Dimension::new("A", 2.0, 0.0, 0.0).with_distribution(distribution);
            assert!(draw(&dim, 50, 19).iter().all(|&v| v == 2.0));
        }
    }
}
