//! Deterministic synthetic series for trying the analyses without real data.

use chrono::{Duration, TimeZone, Utc};
use clap::ValueEnum;
use core_types::{DataPoint, DataSeries};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoKind {
    /// Growing daily sales with a promotional spike.
    Sales,
    /// A slowly depleting stock level with a sudden drop.
    Stock,
}

impl DemoKind {
    pub fn default_name(self) -> &'static str {
        match self {
            DemoKind::Sales => "ventes",
            DemoKind::Stock => "stock",
        }
    }
}

/// Builds a daily series starting 2024-01-01: a linear trend, a weekly cycle,
/// a small fixed ripple and one injected anomaly at two thirds of the span.
pub fn generate(kind: DemoKind, points: usize, name: &str) -> DataSeries {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    let anomaly_at = points * 2 / 3;

    let data = (0..points)
        .map(|i| {
            let t = i as f64;
            let weekly = (2.0 * PI * t / 7.0).sin();
            let mut value = match kind {
                DemoKind::Sales => 1000.0 + 12.0 * t + 150.0 * weekly + 25.0 * (1.7 * t).sin(),
                DemoKind::Stock => 800.0 - 3.0 * t + 60.0 * weekly + 10.0 * (1.3 * t).sin(),
            };
            if i == anomaly_at && points > 2 {
                value *= match kind {
                    DemoKind::Sales => 2.5,
                    DemoKind::Stock => 0.3,
                };
            }
            let value = (value.max(0.0) * 100.0).round() / 100.0;
            DataPoint::new(start + Duration::days(i as i64), value)
        })
        .collect();

    DataSeries::new(name, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnomalyDetector;
    use configuration::DetectionOptions;
    use core_types::AnomalyKind;

    #[test]
    fn generation_is_deterministic() {
        let a = generate(DemoKind::Sales, 90, "ventes");
        let b = generate(DemoKind::Sales, 90, "ventes");
        assert_eq!(a.values(), b.values());
        assert_eq!(a.len(), 90);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn sales_spike_is_detected() {
        let series = generate(DemoKind::Sales, 90, "ventes");
        let spike_at = series.data[60].timestamp;
        let found = AnomalyDetector::new()
            .detect_anomalies(&series, &DetectionOptions::default())
            .unwrap();
        assert!(
            found
                .iter()
                .any(|a| a.timestamp == spike_at && a.kind == AnomalyKind::Spike)
        );
    }

    #[test]
    fn stock_never_goes_negative() {
        let series = generate(DemoKind::Stock, 1000, "stock");
        assert!(series.values().iter().all(|v| *v >= 0.0));
    }
}
