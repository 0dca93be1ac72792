//! Independent anomaly detection strategies.
//!
//! Each strategy inspects a prepared `SeriesContext` and reports the points it
//! considers anomalous. The `AnomalyDetector` decides which strategies to run and
//! how to merge their findings.

use crate::regression::LinearFit;
use crate::report::Anomaly;
use crate::stats::DescriptiveStats;
use core_types::{AnomalyKind, DataPoint, DataSeries, Severity};
use uuid::Uuid;

/// Everything a strategy needs, computed once per detection call.
#[derive(Debug)]
pub struct SeriesContext<'a> {
    pub series: &'a DataSeries,
    pub values: Vec<f64>,
    pub stats: DescriptiveStats,
    /// The z-score threshold requested by the caller.
    pub threshold: f64,
}

/// The core trait that all detection strategies implement.
///
/// The `Send + Sync` bounds allow a configured detector to be shared across
/// request handlers.
pub trait DetectionStrategy: Send + Sync {
    /// A short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Returns every anomaly this strategy finds. Never fails; a strategy that
    /// cannot say anything about the series returns an empty list.
    fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly>;
}

/// Builds an anomaly record with a fresh id.
#[allow(clippy::too_many_arguments)]
pub(crate) fn new_anomaly(
    point: &DataPoint,
    expected_value: f64,
    deviation: f64,
    severity: Severity,
    kind: AnomalyKind,
    confidence: f64,
    description: String,
    suggested_action: &str,
) -> Anomaly {
    Anomaly {
        id: Uuid::new_v4(),
        timestamp: point.timestamp,
        value: point.value,
        expected_value,
        deviation,
        severity,
        kind,
        confidence,
        description,
        suggested_action: suggested_action.to_string(),
        missing_count: None,
    }
}

/// `(value - reference) / reference` in percent, `0.0` when the reference is zero.
pub(crate) fn relative_pct(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        (value - reference) / reference * 100.0
    }
}

fn direction_of(value: f64, reference: f64) -> (AnomalyKind, &'static str) {
    if value >= reference {
        (AnomalyKind::Spike, "Vérifier l'origine de cette hausse inhabituelle")
    } else {
        (AnomalyKind::Drop, "Analyser les causes de cette baisse inhabituelle")
    }
}

// ============================================================================
// Z-Score
// ============================================================================

/// Flags points whose distance to the mean exceeds `threshold` standard deviations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreStrategy;

impl ZScoreStrategy {
    fn severity(z: f64) -> Severity {
        if z > 4.0 {
            Severity::Critical
        } else if z > 3.0 {
            Severity::High
        } else if z > 2.5 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl DetectionStrategy for ZScoreStrategy {
    fn name(&self) -> &'static str {
        "zscore"
    }

    fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
        let mean = context.stats.mean;
        let std_dev = context.stats.standard_deviation;
        if std_dev == 0.0 {
            return Vec::new();
        }

        context
            .series
            .data
            .iter()
            .filter_map(|point| {
                let z = (point.value - mean).abs() / std_dev;
                if z <= context.threshold {
                    return None;
                }
                let (kind, action) = direction_of(point.value, mean);
                Some(new_anomaly(
                    point,
                    mean,
                    relative_pct(point.value, mean),
                    Self::severity(z),
                    kind,
                    (0.5 + z * 0.1).min(0.99),
                    format!(
                        "Valeur {:.2} à {:.1} écarts-types de la moyenne ({:.2})",
                        point.value, z, mean
                    ),
                    action,
                ))
            })
            .collect()
    }
}

// ============================================================================
// Interquartile range
// ============================================================================

/// Flags points outside `[P25 - 1.5·IQR, P75 + 1.5·IQR]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IqrStrategy;

impl IqrStrategy {
    const MULTIPLIER: f64 = 1.5;
    const CONFIDENCE: f64 = 0.75;

    fn severity(deviation_pct: f64) -> Severity {
        let deviation = deviation_pct.abs();
        if deviation > 100.0 {
            Severity::Critical
        } else if deviation > 75.0 {
            Severity::High
        } else if deviation > 50.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl DetectionStrategy for IqrStrategy {
    fn name(&self) -> &'static str {
        "iqr"
    }

    fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
        let stats = &context.stats;
        let iqr = stats.iqr();
        let lower = stats.percentiles.p25 - Self::MULTIPLIER * iqr;
        let upper = stats.percentiles.p75 + Self::MULTIPLIER * iqr;
        let median = stats.median;

        context
            .series
            .data
            .iter()
            .filter(|point| point.value < lower || point.value > upper)
            .map(|point| {
                let deviation = relative_pct(point.value, median);
                let (kind, action) = direction_of(point.value, median);
                new_anomaly(
                    point,
                    median,
                    deviation,
                    Self::severity(deviation),
                    kind,
                    Self::CONFIDENCE,
                    format!(
                        "Valeur {:.2} hors de l'intervalle interquartile [{:.2}, {:.2}]",
                        point.value, lower, upper
                    ),
                    action,
                )
            })
            .collect()
    }
}

// ============================================================================
// Local isolation
// ============================================================================

/// Flags interior points that differ by more than 50% from the average of their
/// two immediate neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalIsolationStrategy;

impl LocalIsolationStrategy {
    const MAX_LOCAL_DEVIATION: f64 = 0.5;
    const CONFIDENCE: f64 = 0.7;
}

impl DetectionStrategy for LocalIsolationStrategy {
    fn name(&self) -> &'static str {
        "isolation"
    }

    fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
        let data = &context.series.data;
        if data.len() < 3 {
            return Vec::new();
        }

        let mut anomalies = Vec::new();
        for i in 1..data.len() - 1 {
            let neighbours = (data[i - 1].value + data[i + 1].value) / 2.0;
            if neighbours == 0.0 {
                continue;
            }
            let local_deviation = (data[i].value - neighbours).abs() / neighbours.abs();
            if local_deviation <= Self::MAX_LOCAL_DEVIATION {
                continue;
            }

            let severity = if local_deviation > 2.0 {
                Severity::High
            } else if local_deviation > 1.0 {
                Severity::Medium
            } else {
                Severity::Low
            };
            anomalies.push(new_anomaly(
                &data[i],
                neighbours,
                relative_pct(data[i].value, neighbours),
                severity,
                AnomalyKind::Outlier,
                Self::CONFIDENCE,
                format!(
                    "Valeur {:.2} s'écarte de {:.0}% de la moyenne de ses voisines ({:.2})",
                    data[i].value,
                    local_deviation * 100.0,
                    neighbours
                ),
                "Comparer avec les périodes adjacentes pour confirmer l'événement",
            ));
        }
        anomalies
    }
}

// ============================================================================
// Trend break
// ============================================================================

/// Flags points where the local regression slope flips sign.
///
/// Two windows of `min(5, n / 3)` points are fitted immediately before and after
/// each candidate. The flagged value itself is not anomalous, only the change of
/// direction, so its expected value is the value itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendBreakStrategy;

impl TrendBreakStrategy {
    const MIN_SLOPE_CHANGE: f64 = 0.1;
    const CONFIDENCE: f64 = 0.65;
}

impl DetectionStrategy for TrendBreakStrategy {
    fn name(&self) -> &'static str {
        "trend_break"
    }

    fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
        let values = &context.values;
        let n = values.len();
        let window = (n / 3).min(5);
        if window < 2 {
            return Vec::new();
        }

        let mut anomalies = Vec::new();
        for i in window..=(n - window) {
            let before = LinearFit::fit(&values[i - window..i]).slope;
            let after = LinearFit::fit(&values[i..i + window]).slope;
            let reverses = before * after < 0.0;
            if !reverses || (before - after).abs() <= Self::MIN_SLOPE_CHANGE {
                continue;
            }

            let point = &context.series.data[i];
            anomalies.push(new_anomaly(
                point,
                point.value,
                0.0,
                Severity::Medium,
                AnomalyKind::TrendBreak,
                Self::CONFIDENCE,
                format!(
                    "Changement de direction : pente {:.2} avant ce point, {:.2} après",
                    before, after
                ),
                "Identifier l'événement à l'origine du retournement de tendance",
            ));
        }
        anomalies
    }
}
