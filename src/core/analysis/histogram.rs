//! Histogram builder for Monte Carlo samples
//!
//! Bins are equal-width over `[min, max]`. Bin `i` is half-open
//! `[start_i, start_i + width)` except the last bin, which is closed so the
//! maximum sample is always counted. A zero-width range puts every sample in
//! bin 0.

use serde::{Deserialize, Serialize};

/// Number of bins used when none is configured
pub const DEFAULT_BINS: usize = 40;

/// One histogram bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Bin center
    pub bin: f64,

    /// Number of samples in the bin
    pub count: usize,
}

/// Bin `samples` into `bins` equal-width bins spanning `[min, max]`
///
/// Counts always sum to `samples.len()` provided every sample lies in
/// `[min, max]`. Returns an empty histogram for zero bins or no samples.
pub fn build_histogram(samples: &[f64], min: f64, max: f64, bins: usize) -> Vec<HistogramBin> {
    if bins == 0 || samples.is_empty() {
        return Vec::new();
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];

    for &sample in samples {
        let idx = if width > 0.0 {
            (((sample - min) / width).floor().max(0.0) as usize).min(bins - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            bin: min + i as f64 * width + width / 2.0,
            count,
        })
        .collect()
}
