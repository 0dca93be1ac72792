use crate::error::AnalyticsError;
use crate::report::Anomaly;
use crate::stats::{DescriptiveStats, StatisticsEngine};
use crate::strategies::{
    DetectionStrategy, IqrStrategy, LocalIsolationStrategy, SeriesContext, TrendBreakStrategy,
    ZScoreStrategy, relative_pct,
};
use chrono::{DateTime, Duration, Utc};
use configuration::DetectionOptions;
use core_types::{AnomalyKind, DataSeries, DetectionMethod, Severity};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Detects outliers, spikes, drops, trend breaks and gaps in a series.
///
/// The detector is stateless between calls. Additional strategies injected with
/// `with_strategy` run alongside the built-in ones under `DetectionMethod::Combined`.
pub struct AnomalyDetector {
    stats: StatisticsEngine,
    extra_strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.extra_strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("AnomalyDetector")
            .field("extra_strategies", &names)
            .finish()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyDetector {
    /// Series shorter than this produce no anomalies.
    pub const MIN_POINTS: usize = 5;

    const CONFIDENCE_BOOST: f64 = 0.1;
    const MAX_CONFIDENCE: f64 = 0.99;
    const MISSING_CONFIDENCE: f64 = 0.9;

    pub fn new() -> Self {
        Self {
            stats: StatisticsEngine::new(),
            extra_strategies: Vec::new(),
        }
    }

    /// Registers an additional strategy for combined detection.
    pub fn with_strategy(mut self, strategy: impl DetectionStrategy + 'static) -> Self {
        self.extra_strategies.push(Box::new(strategy));
        self
    }

    /// Descriptive statistics of the raw values.
    pub fn calculate_stats(&self, values: &[f64]) -> Option<DescriptiveStats> {
        self.stats.describe(values)
    }

    /// The main entry point for anomaly detection.
    ///
    /// # Returns
    ///
    /// Anomalies sorted newest first, or an empty list when the series has fewer
    /// than `MIN_POINTS` points. Gap detection always runs, whatever the method.
    pub fn detect_anomalies(
        &self,
        series: &DataSeries,
        options: &DetectionOptions,
    ) -> Result<Vec<Anomaly>, AnalyticsError> {
        series.validate()?;
        options.validate()?;

        if series.len() < Self::MIN_POINTS {
            tracing::debug!(
                series = %series.name,
                points = series.len(),
                "Not enough points for anomaly detection."
            );
            return Ok(Vec::new());
        }

        let values = series.values();
        let Some(stats) = self.stats.describe(&values) else {
            return Ok(Vec::new());
        };
        let context = SeriesContext {
            series,
            values,
            stats,
            threshold: options.threshold,
        };

        let mut merged: HashMap<(DateTime<Utc>, AnomalyKind), Anomaly> = HashMap::new();
        for strategy in self.strategies_for(options.method) {
            let found = strategy.detect(&context);
            tracing::debug!(
                strategy = strategy.name(),
                found = found.len(),
                "Detection strategy finished."
            );
            for anomaly in found {
                merge_into(&mut merged, anomaly);
            }
        }

        let mut anomalies: Vec<Anomaly> = merged.into_values().collect();
        anomalies.extend(detect_missing(series));
        anomalies.sort_by(newest_first);

        tracing::info!(
            series = %series.name,
            method = ?options.method,
            anomalies = anomalies.len(),
            "Anomaly detection completed."
        );
        Ok(anomalies)
    }

    fn strategies_for(&self, method: DetectionMethod) -> Vec<&dyn DetectionStrategy> {
        match method {
            DetectionMethod::Zscore => vec![&ZScoreStrategy],
            DetectionMethod::Iqr => vec![&IqrStrategy],
            DetectionMethod::Isolation => vec![&LocalIsolationStrategy],
            DetectionMethod::TrendBreak => vec![&TrendBreakStrategy],
            DetectionMethod::Combined => {
                let mut strategies: Vec<&dyn DetectionStrategy> =
                    vec![&ZScoreStrategy, &IqrStrategy, &TrendBreakStrategy];
                strategies.extend(self.extra_strategies.iter().map(|s| s.as_ref()));
                strategies
            }
        }
    }
}

/// Keeps one anomaly per `(timestamp, type)`.
///
/// When several strategies agree, the more confident record wins, takes the more
/// severe of the two ratings, and gains a confidence boost.
fn merge_into(merged: &mut HashMap<(DateTime<Utc>, AnomalyKind), Anomaly>, anomaly: Anomaly) {
    let key = (anomaly.timestamp, anomaly.kind);
    match merged.remove(&key) {
        None => {
            merged.insert(key, anomaly);
        }
        Some(existing) => {
            let severity = existing.severity.max(anomaly.severity);
            let mut winner = if anomaly.confidence > existing.confidence {
                anomaly
            } else {
                existing
            };
            winner.severity = severity;
            winner.confidence = (winner.confidence + AnomalyDetector::CONFIDENCE_BOOST)
                .min(AnomalyDetector::MAX_CONFIDENCE);
            merged.insert(key, winner);
        }
    }
}

/// Flags gaps longer than twice the average spacing between points.
fn detect_missing(series: &DataSeries) -> Vec<Anomaly> {
    let Some(average) = series.average_interval_ms() else {
        return Vec::new();
    };
    if average <= 0.0 {
        return Vec::new();
    }

    let mut anomalies = Vec::new();
    for pair in series.data.windows(2) {
        let gap = (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64;
        if gap <= 2.0 * average {
            continue;
        }
        let missing = ((gap / average).round() as usize).saturating_sub(1);
        if missing == 0 {
            continue;
        }

        let expected = (pair[0].value + pair[1].value) / 2.0;
        let severity = if missing > 3 {
            Severity::High
        } else {
            Severity::Medium
        };
        anomalies.push(Anomaly {
            id: Uuid::new_v4(),
            timestamp: pair[0].timestamp + Duration::milliseconds(average.round() as i64),
            value: 0.0,
            expected_value: expected,
            deviation: relative_pct(0.0, expected),
            severity,
            kind: AnomalyKind::Missing,
            confidence: AnomalyDetector::MISSING_CONFIDENCE,
            description: format!(
                "Environ {} point(s) manquant(s) après le {}",
                missing,
                pair[0].timestamp.format("%Y-%m-%d")
            ),
            suggested_action: "Vérifier la collecte des données sur cette période".to_string(),
            missing_count: Some(missing),
        });
    }
    anomalies
}

/// Timestamp descending; ties broken by severity, confidence, then type for a stable order.
fn newest_first(a: &Anomaly, b: &Anomaly) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.severity.cmp(&a.severity))
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.kind.cmp(&b.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::new_anomaly;
    use chrono::TimeZone;
    use core_types::DataPoint;

    fn daily(values: &[f64]) -> DataSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        DataSeries::new(
            "stock",
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| DataPoint::new(start + Duration::days(i as i64), v))
                .collect(),
        )
    }

    struct EverythingIsOdd;

    impl DetectionStrategy for EverythingIsOdd {
        fn name(&self) -> &'static str {
            "everything"
        }

        fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
            context
                .series
                .data
                .iter()
                .map(|p| {
                    new_anomaly(
                        p,
                        p.value,
                        0.0,
                        Severity::Low,
                        AnomalyKind::Outlier,
                        0.3,
                        "test".to_string(),
                        "rien",
                    )
                })
                .collect()
        }
    }

    struct ConfidentSpikes;

    impl DetectionStrategy for ConfidentSpikes {
        fn name(&self) -> &'static str {
            "confident_spikes"
        }

        fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
            context
                .series
                .data
                .iter()
                .filter(|p| p.value > 50.0)
                .map(|p| {
                    new_anomaly(
                        p,
                        10.0,
                        0.0,
                        Severity::Low,
                        AnomalyKind::Spike,
                        0.95,
                        "test".to_string(),
                        "rien",
                    )
                })
                .collect()
        }
    }

    #[test]
    fn short_series_yield_nothing() {
        let detector = AnomalyDetector::new();
        let found = detector
            .detect_anomalies(&daily(&[1.0, 2.0, 100.0]), &DetectionOptions::default())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn agreeing_methods_are_merged_and_boosted() {
        let detector = AnomalyDetector::new();
        let series = daily(&[10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0]);
        let found = detector
            .detect_anomalies(&series, &DetectionOptions::default())
            .unwrap();
        let spikes: Vec<_> = found.iter().filter(|a| a.kind == AnomalyKind::Spike).collect();
        assert_eq!(spikes.len(), 1);
        // z-score (0.8) and IQR (0.75) agree: the z-score record wins and gains +0.1,
        // and IQR's critical rating is kept.
        assert!((spikes[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(spikes[0].severity, Severity::Critical);
    }

    #[test]
    fn output_is_newest_first() {
        let detector = AnomalyDetector::new();
        let series = daily(&[10.0, 90.0, 10.0, 11.0, 10.0, 9.0, 10.0, 0.5, 10.0, 11.0]);
        let found = detector
            .detect_anomalies(&series, &DetectionOptions::default())
            .unwrap();
        assert!(found.len() >= 2);
        assert!(found.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn missing_runs_are_reported_with_any_method() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut points: Vec<DataPoint> = (0..6)
            .map(|i| DataPoint::new(start + Duration::days(i), 10.0))
            .collect();
        points.push(DataPoint::new(start + Duration::days(12), 10.0));
        let series = DataSeries::new("gap", points);

        let options = DetectionOptions {
            method: DetectionMethod::Zscore,
            ..Default::default()
        };
        let found = AnomalyDetector::new().detect_anomalies(&series, &options).unwrap();
        assert_eq!(found.len(), 1);
        let gap = &found[0];
        assert_eq!(gap.kind, AnomalyKind::Missing);
        assert_eq!(gap.confidence, 0.9);
        // average spacing is 2 days, the 7-day gap is about 3.5 intervals -> 3 missing.
        assert_eq!(gap.missing_count, Some(3));
        assert_eq!(gap.severity, Severity::Medium);
    }

    #[test]
    fn injected_strategy_runs_only_in_combined_mode() {
        let detector = AnomalyDetector::new().with_strategy(EverythingIsOdd);
        let series = daily(&[5.0, 5.1, 4.9, 5.0, 5.05, 4.95]);

        let combined = detector
            .detect_anomalies(&series, &DetectionOptions::default())
            .unwrap();
        assert_eq!(combined.iter().filter(|a| a.kind == AnomalyKind::Outlier).count(), 6);

        let zscore_only = DetectionOptions {
            method: DetectionMethod::Zscore,
            ..Default::default()
        };
        let found = detector.detect_anomalies(&series, &zscore_only).unwrap();
        assert!(found.iter().all(|a| a.kind != AnomalyKind::Outlier));
    }

    #[test]
    fn non_monotonic_series_is_rejected() {
        let mut series = daily(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        series.data.swap(0, 5);
        let result = AnomalyDetector::new().detect_anomalies(&series, &DetectionOptions::default());
        assert!(matches!(result, Err(AnalyticsError::InvalidSeries(_))));
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        let options = DetectionOptions {
            threshold: -1.0,
            ..Default::default()
        };
        let result = AnomalyDetector::new().detect_anomalies(&daily(&[1.0; 6]), &options);
        assert!(matches!(result, Err(AnalyticsError::InvalidOptions(_))));
    }

    #[test]
    fn merged_confidence_is_capped() {
        let detector = AnomalyDetector::new().with_strategy(ConfidentSpikes);
        let series = daily(&[10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0]);
        let found = detector
            .detect_anomalies(&series, &DetectionOptions::default())
            .unwrap();
        let spikes: Vec<_> = found.iter().filter(|a| a.kind == AnomalyKind::Spike).collect();
        assert_eq!(spikes.len(), 1);
        // z-score and IQR merge to 0.9; the 0.95 record then wins and is capped.
        assert_eq!(spikes[0].confidence, 0.99);
        assert_eq!(spikes[0].severity, Severity::Critical);
    }
}
