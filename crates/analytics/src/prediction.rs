use crate::error::AnalyticsError;
use crate::regression::{ExponentialFit, FittedModel, LinearFit, QuadraticFit};
use crate::report::{Factor, Prediction, Seasonality, Trend};
use crate::stats::mean;
use chrono::Duration;
use configuration::PredictionOptions;
use core_types::{DataSeries, ModelKind, TrendDirection};
use uuid::Uuid;

/// Fits regression models to a series, forecasts future periods and characterises
/// the series' trend.
#[derive(Debug, Default, Clone, Copy)]
pub struct PredictionEngine;

impl PredictionEngine {
    /// Series shorter than this produce no predictions.
    pub const MIN_POINTS: usize = 3;
    /// Seasonality is only looked for in series at least this long.
    pub const MIN_SEASONAL_POINTS: usize = 14;

    /// Minimum R² a non-linear model needs before it can be auto-selected.
    const MIN_R_SQUARED: f64 = 0.7;
    /// A higher-order model must beat the simpler one by more than rounding noise.
    const R_SQUARED_MARGIN: f64 = 1e-6;
    const STABLE_SLOPE: f64 = 0.01;
    const VOLATILE_CV: f64 = 0.3;
    const SEASONAL_CORRELATION: f64 = 0.5;
    const MIN_LAG: usize = 7;
    const MAX_LAG: usize = 30;
    const HORIZON_DECAY: f64 = 0.9;
    const VOLATILITY_PENALTY: f64 = 0.7;
    const MOMENTUM_POINTS: usize = 5;

    pub fn new() -> Self {
        Self
    }

    /// Forecasts `options.horizon` future periods.
    ///
    /// # Returns
    ///
    /// One prediction per horizon step in ascending order, or an empty list when the
    /// series has fewer than `MIN_POINTS` points. Forecasts and lower bounds are
    /// floored at 0. Steps whose target date cannot be represented are dropped.
    pub fn predict(
        &self,
        series: &DataSeries,
        options: &PredictionOptions,
    ) -> Result<Vec<Prediction>, AnalyticsError> {
        series.validate()?;
        options.validate()?;

        let n = series.len();
        let (Some(last), true) = (series.last(), n >= Self::MIN_POINTS) else {
            tracing::debug!(series = %series.name, points = n, "Not enough points for prediction.");
            return Ok(Vec::new());
        };

        let values = series.values();
        let kind = options
            .model
            .fixed()
            .unwrap_or_else(|| self.select_best_model(&values));
        let model = FittedModel::fit(kind, &values);
        let trend = self.trend_of(&values);

        // The interval width always comes from the linear residuals, whatever model forecasts.
        let standard_error = LinearFit::fit(&values).standard_error(&values);
        let z = z_score_for(options.confidence_level);
        let interval_ms = series
            .average_interval_ms()
            .filter(|ms| *ms > 0.0)
            .unwrap_or(Duration::days(1).num_milliseconds() as f64);

        let mut base_confidence = model.r_squared().clamp(0.0, 1.0);
        if trend.direction == TrendDirection::Volatile {
            base_confidence *= Self::VOLATILITY_PENALTY;
        }
        let factors = self.factors(&values, &trend);

        let predictions: Vec<Prediction> = (1..=options.horizon)
            .map_while(|k| {
                let step = Duration::try_milliseconds((interval_ms * k as f64).round() as i64)?;
                let target_date = last.timestamp.checked_add_signed(step)?;
                let x = (n + k - 1) as f64;
                let predicted_value = model.evaluate(x).max(0.0);
                let margin = standard_error * z * (1.0 + k as f64 / n as f64).sqrt();
                // Near zero the band is shifted up rather than cut, so its width stays 2 * margin.
                let lower_bound = (predicted_value - margin).max(0.0);
                let upper_bound = lower_bound + 2.0 * margin;
                Some(Prediction {
                    id: Uuid::new_v4(),
                    target_date,
                    predicted_value,
                    lower_bound,
                    upper_bound,
                    confidence: base_confidence * Self::HORIZON_DECAY.powi(k as i32),
                    model: model.kind(),
                    factors: factors.clone(),
                })
            })
            .collect();

        if predictions.len() < options.horizon {
            tracing::warn!(
                series = %series.name,
                requested = options.horizon,
                produced = predictions.len(),
                "Forecast truncated at the last representable date."
            );
        }

        tracing::info!(
            series = %series.name,
            model = %model.kind(),
            r_squared = model.r_squared(),
            horizon = options.horizon,
            "Prediction completed."
        );
        Ok(predictions)
    }

    /// Picks the model family with the best R².
    ///
    /// Exponential wins if it beats both others and exceeds 0.7; otherwise polynomial
    /// wins if it beats linear and exceeds 0.7; otherwise linear.
    pub fn select_best_model(&self, values: &[f64]) -> ModelKind {
        let linear = LinearFit::fit(values).r_squared;
        let polynomial = QuadraticFit::fit(values)
            .map(|fit| fit.r_squared)
            .unwrap_or(f64::NEG_INFINITY);
        let exponential = ExponentialFit::fit(values).r_squared;

        let beats = |candidate: f64, other: f64| candidate > other + Self::R_SQUARED_MARGIN;

        let choice = if beats(exponential, linear)
            && beats(exponential, polynomial)
            && exponential > Self::MIN_R_SQUARED
        {
            ModelKind::Exponential
        } else if beats(polynomial, linear) && polynomial > Self::MIN_R_SQUARED {
            ModelKind::Polynomial
        } else {
            ModelKind::Linear
        };
        tracing::debug!(linear, polynomial, exponential, choice = %choice, "Model selection.");
        choice
    }

    /// Characterises direction, speed, acceleration and seasonality of a series.
    pub fn analyze_trend(&self, series: &DataSeries) -> Result<Trend, AnalyticsError> {
        series.validate()?;
        Ok(self.trend_of(&series.values()))
    }

    pub(crate) fn trend_of(&self, values: &[f64]) -> Trend {
        if values.len() < 2 {
            return Trend {
                direction: TrendDirection::Stable,
                slope: 0.0,
                r_squared: 0.0,
                change_rate: 0.0,
                acceleration: 0.0,
                seasonality: Seasonality::none(),
            };
        }

        let fit = LinearFit::fit(values);
        let mid = values.len() / 2;
        let acceleration = change_rate(&values[mid..]) - change_rate(&values[..mid]);

        Trend {
            direction: self.direction_of(values, &fit),
            slope: fit.slope,
            r_squared: fit.r_squared,
            change_rate: change_rate(values),
            acceleration,
            seasonality: self.detect_seasonality(values),
        }
    }

    /// Stable below a minimal slope; volatile when the scatter around the fitted
    /// line exceeds 30% of the mean; otherwise the sign of the slope.
    fn direction_of(&self, values: &[f64], fit: &LinearFit) -> TrendDirection {
        if fit.slope.abs() < Self::STABLE_SLOPE {
            return TrendDirection::Stable;
        }

        if residual_variation(values, fit) > Self::VOLATILE_CV {
            TrendDirection::Volatile
        } else if fit.slope > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }

    /// Autocorrelation scan over lags `7..=min(30, n/2)`.
    pub fn detect_seasonality(&self, values: &[f64]) -> Seasonality {
        let n = values.len();
        if n < Self::MIN_SEASONAL_POINTS {
            return Seasonality::none();
        }

        let average = mean(values);
        let variance = values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / n as f64;
        if variance == 0.0 {
            return Seasonality::none();
        }

        let max_lag = Self::MAX_LAG.min(n / 2);
        let mut best: Option<(usize, f64)> = None;
        for lag in Self::MIN_LAG..=max_lag {
            let covariance = (0..n - lag)
                .map(|i| (values[i] - average) * (values[i + lag] - average))
                .sum::<f64>()
                / (n - lag) as f64;
            let correlation = covariance / variance;
            // Ties go to the shorter lag; multiples of the true period score the same.
            if best.is_none_or(|(_, c)| correlation > c + 1e-9) {
                best = Some((lag, correlation));
            }
        }

        match best {
            Some((period, correlation)) if correlation > Self::SEASONAL_CORRELATION => Seasonality {
                detected: true,
                period,
                amplitude: seasonal_amplitude(values, period),
            },
            _ => Seasonality::none(),
        }
    }

    fn factors(&self, values: &[f64], trend: &Trend) -> Vec<Factor> {
        let average = mean(values);
        let scale = if average == 0.0 { 1.0 } else { average.abs() };

        let tail = &values[values.len().saturating_sub(Self::MOMENTUM_POINTS)..];
        let momentum = if tail.len() > 1 {
            (tail[tail.len() - 1] - tail[0]) / (tail.len() - 1) as f64
        } else {
            0.0
        };

        let mut factors = vec![
            Factor {
                name: "Tendance historique".to_string(),
                impact: trend.slope / scale * 100.0,
            },
            Factor {
                name: "Momentum récent".to_string(),
                impact: momentum / scale * 100.0,
            },
        ];
        if trend.seasonality.detected {
            factors.push(Factor {
                name: "Effet saisonnier".to_string(),
                impact: trend.seasonality.amplitude / scale * 100.0,
            });
        }
        factors
    }
}

/// Scatter of `values` around `fit`: RMS residual over the absolute mean, `0.0`
/// when the mean is zero.
pub(crate) fn residual_variation(values: &[f64], fit: &LinearFit) -> f64 {
    let average = mean(values);
    if average == 0.0 || values.is_empty() {
        return 0.0;
    }
    let residual_variance = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (y - fit.evaluate(i as f64)).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    residual_variance.sqrt() / average.abs()
}

/// Mean relative change between consecutive values, skipping zero denominators.
fn change_rate(values: &[f64]) -> f64 {
    let rates: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0].abs())
        .collect();
    mean(&rates)
}

/// Half the spread between the highest and lowest per-phase averages.
fn seasonal_amplitude(values: &[f64], period: usize) -> f64 {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, &v) in values.iter().enumerate() {
        sums[i % period] += v;
        counts[i % period] += 1;
    }
    let phase_means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .filter(|(_, c)| **c > 0)
        .map(|(s, c)| s / *c as f64)
        .collect();
    let max = phase_means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = phase_means.iter().copied().fold(f64::INFINITY, f64::min);
    (max - min) / 2.0
}

/// Two-sided normal quantile for the supported confidence levels.
fn z_score_for(confidence_level: f64) -> f64 {
    if confidence_level >= 0.99 {
        2.576
    } else if confidence_level >= 0.95 {
        1.96
    } else {
        1.645
    }
}
