//! Least-squares model fitting over an index axis (`x = 0..n-1`).
//!
//! Every fit reports its R² on the original value scale so that the three model
//! families can be compared with each other.

use crate::stats::mean;
use core_types::ModelKind;

/// `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Ordinary least squares of `values` against their index.
    ///
    /// A single point (or an empty slice) yields a flat line through the mean.
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let y_mean = mean(values);
        if values.len() < 2 {
            return Self {
                slope: 0.0,
                intercept: y_mean,
                r_squared: 1.0,
            };
        }

        let x_mean = (n - 1.0) / 2.0;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            sxy += dx * (y - y_mean);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;
        let r_squared = r_squared(values, |x| slope * x + intercept);
        Self {
            slope,
            intercept,
            r_squared,
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Standard error of the residuals, `sqrt(SSR / (n - 2))`.
    ///
    /// Returns `0.0` when there are not enough degrees of freedom.
    pub fn standard_error(&self, values: &[f64]) -> f64 {
        if values.len() <= 2 {
            return 0.0;
        }
        let ssr: f64 = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (y - self.evaluate(i as f64)).powi(2))
            .sum();
        (ssr / (values.len() - 2) as f64).sqrt()
    }
}

/// `y = a * x² + b * x + c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub r_squared: f64,
}

impl QuadraticFit {
    /// Solves the 3x3 least-squares normal equations directly.
    ///
    /// Returns `None` when the system is singular (fewer than three distinct x values).
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.len() < 3 {
            return None;
        }

        let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
        let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            let x2 = x * x;
            s1 += x;
            s2 += x2;
            s3 += x2 * x;
            s4 += x2 * x2;
            sy += y;
            sxy += x * y;
            sx2y += x2 * y;
        }
        let n = values.len() as f64;

        // Unknowns ordered (c, b, a).
        let mut system = [
            [n, s1, s2, sy],
            [s1, s2, s3, sxy],
            [s2, s3, s4, sx2y],
        ];
        let [c, b, a] = solve_3x3(&mut system)?;
        let r_squared = r_squared(values, |x| a * x * x + b * x + c);
        Some(Self { a, b, c, r_squared })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }
}

/// `y = a * e^(b * x)`, fitted as a line through `ln(y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialFit {
    pub a: f64,
    pub b: f64,
    pub r_squared: f64,
}

impl ExponentialFit {
    /// Non-positive values cannot be log-transformed; they are treated as `ln(y) = 0`.
    pub fn fit(values: &[f64]) -> Self {
        let non_positive = values.iter().filter(|v| **v <= 0.0).count();
        if non_positive > 0 {
            tracing::warn!(
                non_positive,
                "Exponential fit received non-positive values; their log is taken as 0."
            );
        }

        let logs: Vec<f64> = values
            .iter()
            .map(|&v| if v > 0.0 { v.ln() } else { 0.0 })
            .collect();
        let line = LinearFit::fit(&logs);
        let a = line.intercept.exp();
        let b = line.slope;
        let r_squared = r_squared(values, |x| a * (b * x).exp());
        Self { a, b, r_squared }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (self.b * x).exp()
    }
}

/// A fitted model of any supported family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedModel {
    Linear(LinearFit),
    Polynomial(QuadraticFit),
    Exponential(ExponentialFit),
}

impl FittedModel {
    /// Fits `kind` to `values`. A singular quadratic system falls back to a line.
    pub fn fit(kind: ModelKind, values: &[f64]) -> Self {
        match kind {
            ModelKind::Linear => FittedModel::Linear(LinearFit::fit(values)),
            ModelKind::Polynomial => match QuadraticFit::fit(values) {
                Some(fit) => FittedModel::Polynomial(fit),
                None => FittedModel::Linear(LinearFit::fit(values)),
            },
            ModelKind::Exponential => FittedModel::Exponential(ExponentialFit::fit(values)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Linear(_) => ModelKind::Linear,
            FittedModel::Polynomial(_) => ModelKind::Polynomial,
            FittedModel::Exponential(_) => ModelKind::Exponential,
        }
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            FittedModel::Linear(fit) => fit.evaluate(x),
            FittedModel::Polynomial(fit) => fit.evaluate(x),
            FittedModel::Exponential(fit) => fit.evaluate(x),
        }
    }

    pub fn r_squared(&self) -> f64 {
        match self {
            FittedModel::Linear(fit) => fit.r_squared,
            FittedModel::Polynomial(fit) => fit.r_squared,
            FittedModel::Exponential(fit) => fit.r_squared,
        }
    }
}

/// Coefficient of determination of `predict` against `values` on the index axis.
///
/// A constant series has no variance to explain; it scores `1.0` when the model
/// reproduces it and `0.0` otherwise.
fn r_squared(values: &[f64], predict: impl Fn(f64) -> f64) -> f64 {
    let y_mean = mean(values);
    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, &y) in values.iter().enumerate() {
        ss_tot += (y - y_mean).powi(2);
        ss_res += (y - predict(i as f64)).powi(2);
    }
    if ss_tot == 0.0 {
        return if ss_res < 1e-12 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Gaussian elimination with partial pivoting on an augmented 3x4 matrix.
fn solve_3x3(m: &mut [[f64; 4]; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot_row = (col..3).max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))?;
        if m[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        m.swap(col, pivot_row);
        for row in (col + 1)..3 {
            let factor = m[row][col] / m[col][col];
            for k in col..4 {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut solution = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = ((row + 1)..3).map(|k| m[row][k] * solution[k]).sum();
        solution[row] = (m[row][3] - tail) / m[row][row];
    }
    Some(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn linear_fit_recovers_line() {
        let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 3.0).collect();
        let fit = LinearFit::fit(&values);
        assert!(close(fit.slope, 2.0, 1e-9));
        assert!(close(fit.intercept, 3.0, 1e-9));
        assert!(close(fit.r_squared, 1.0, 1e-9));
        assert!(close(fit.standard_error(&values), 0.0, 1e-9));
    }

    #[test]
    fn quadratic_fit_recovers_parabola() {
        let values: Vec<f64> = (0..8)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x - 3.0 * x + 7.0
            })
            .collect();
        let fit = QuadraticFit::fit(&values).unwrap();
        assert!(close(fit.a, 0.5, 1e-6));
        assert!(close(fit.b, -3.0, 1e-6));
        assert!(close(fit.c, 7.0, 1e-6));
        assert!(close(fit.r_squared, 1.0, 1e-9));
    }

    #[test]
    fn quadratic_least_squares_on_noisy_points() {
        // numpy.polyfit([0, 1, 2, 3, 4], [1, 3, 2, 5, 4], 2) -> [-0.142857, 1.371429, 1.114286]
        let fit = QuadraticFit::fit(&[1.0, 3.0, 2.0, 5.0, 4.0]).unwrap();
        assert!(close(fit.a, -1.0 / 7.0, 1e-6));
        assert!(close(fit.b, 1.371_428_571, 1e-6));
        assert!(close(fit.c, 1.114_285_714, 1e-6));
    }

    #[test]
    fn quadratic_needs_three_points() {
        assert!(QuadraticFit::fit(&[1.0, 2.0]).is_none());
        let model = FittedModel::fit(ModelKind::Polynomial, &[1.0, 2.0]);
        assert_eq!(model.kind(), ModelKind::Linear);
    }

    #[test]
    fn exponential_fit_recovers_growth() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 * (0.2 * i as f64).exp()).collect();
        let fit = ExponentialFit::fit(&values);
        assert!(close(fit.a, 3.0, 1e-6));
        assert!(close(fit.b, 0.2, 1e-9));
        assert!(close(fit.r_squared, 1.0, 1e-9));
    }

    #[test]
    fn exponential_fit_tolerates_non_positive_values() {
        let fit = ExponentialFit::fit(&[0.0, -1.0, 2.0, 4.0]);
        assert!(fit.a.is_finite());
        assert!(fit.b.is_finite());
    }
}
