use serde::{Deserialize, Serialize};

/// Descriptive statistics for a numeric sample.
///
/// Variance and standard deviation are population figures (divided by `n`).
/// For a constant sample (`σ = 0`) skewness and excess kurtosis are reported as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub standard_deviation: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub percentiles: Percentiles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl DescriptiveStats {
    /// Interquartile range, `P75 - P25`.
    pub fn iqr(&self) -> f64 {
        self.percentiles.p75 - self.percentiles.p25
    }

    /// Coefficient of variation (`σ / |μ|`), or `0.0` when the mean is zero.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.standard_deviation / self.mean.abs()
        }
    }
}

/// A stateless calculator for descriptive statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatisticsEngine;

impl StatisticsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes the full set of descriptive statistics for `values`.
    ///
    /// The input may be in any order. Returns `None` for an empty sample.
    pub fn describe(&self, values: &[f64]) -> Option<DescriptiveStats> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let standard_deviation = variance.sqrt();

        let (skewness, kurtosis) = if standard_deviation > 0.0 {
            let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
            let m4 = values.iter().map(|v| (v - mean).powi(4)).sum::<f64>() / n;
            (
                m3 / standard_deviation.powi(3),
                m4 / standard_deviation.powi(4) - 3.0,
            )
        } else {
            tracing::debug!(
                count = values.len(),
                "Zero variance sample; skewness and kurtosis set to 0."
            );
            (0.0, 0.0)
        };

        let median = percentile(&sorted, 50.0);

        Some(DescriptiveStats {
            count: values.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            median,
            standard_deviation,
            variance,
            skewness,
            kurtosis,
            percentiles: Percentiles {
                p25: percentile(&sorted, 25.0),
                p50: median,
                p75: percentile(&sorted, 75.0),
                p90: percentile(&sorted, 90.0),
                p95: percentile(&sorted, 95.0),
                p99: percentile(&sorted, 99.0),
            },
        })
    }
}

/// Linear-interpolation percentile of an ascending sample (NumPy's default method).
///
/// `p` is expressed in percent and clamped to `[0, 100]`. Returns `NaN` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = p.clamp(0.0, 100.0);
    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    let weight = index - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Arithmetic mean, `0.0` for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
