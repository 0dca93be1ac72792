//! End-to-end behaviour of the analytics pipeline on hand-built series.

use analytics::{AnomalyDetector, InsightGenerator, PredictionEngine, StatisticsEngine, percentile};
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{DetectionOptions, InsightOptions, PredictionOptions};
use core_types::{
    AnomalyKind, DataPoint, DataSeries, DetectionMethod, ModelChoice, ModelKind, Severity,
    TrendDirection,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn daily(name: &str, values: &[f64]) -> DataSeries {
    DataSeries::new(
        name,
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DataPoint::new(start() + Duration::days(i as i64), v))
            .collect(),
    )
}

fn monthly(name: &str, values: &[f64]) -> DataSeries {
    DataSeries::new(
        name,
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let year = 2023 + (i / 12) as i32;
                let month = (i % 12) as u32 + 1;
                DataPoint::new(Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(), v)
            })
            .collect(),
    )
}

#[test]
fn median_is_the_fiftieth_percentile() {
    let odd = [3.0, 1.0, 2.0, 5.0, 4.0];
    let stats = StatisticsEngine::new().describe(&odd).unwrap();
    assert_eq!(stats.median, 3.0);

    let mut even: Vec<f64> = vec![8.0, 2.0, 6.0, 4.0];
    even.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(percentile(&even, 50.0), 5.0);
}

#[test]
fn zscore_flags_single_extreme_point_as_critical() {
    // 29 points within one standard deviation of 100 and one far above.
    let mut values: Vec<f64> = (0..30)
        .map(|i| if i % 2 == 0 { 101.0 } else { 99.0 })
        .collect();
    values[15] = 110.0;
    let options = DetectionOptions {
        method: DetectionMethod::Zscore,
        ..Default::default()
    };

    let found = AnomalyDetector::new()
        .detect_anomalies(&daily("stock", &values), &options)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, 110.0);
    assert_eq!(found[0].severity, Severity::Critical);
    assert_eq!(found[0].kind, AnomalyKind::Spike);
}

#[test]
fn iqr_flags_the_injected_value_only() {
    let mut values: Vec<f64> = (10..30).map(|v| v as f64).collect();
    values[12] = 500.0;
    let options = DetectionOptions {
        method: DetectionMethod::Iqr,
        ..Default::default()
    };

    let found = AnomalyDetector::new()
        .detect_anomalies(&daily("ventes", &values), &options)
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value, 500.0);
    assert_eq!(found[0].timestamp, start() + Duration::days(12));
}

#[test]
fn ten_day_gap_is_reported_as_missing_run() {
    let mut points: Vec<DataPoint> = (0..100)
        .map(|d| DataPoint::new(start() + Duration::days(d), 50.0))
        .collect();
    points.extend((109..209).map(|d| DataPoint::new(start() + Duration::days(d), 50.0)));
    let series = DataSeries::new("commandes", points);

    let found = AnomalyDetector::new()
        .detect_anomalies(&series, &DetectionOptions::default())
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].kind, AnomalyKind::Missing);
    let missing = found[0].missing_count.unwrap();
    assert!((8..=10).contains(&missing), "missing = {missing}");
}

#[test]
fn perfect_line_selects_linear_and_extends_it() {
    let values: Vec<f64> = (0..10).map(|x| 2.0 * x as f64 + 3.0).collect();
    let engine = PredictionEngine::new();
    assert_eq!(engine.select_best_model(&values), ModelKind::Linear);

    let predictions = engine
        .predict(&daily("ligne", &values), &PredictionOptions::default())
        .unwrap();
    assert_eq!(predictions.len(), 5);
    assert!((predictions[0].predicted_value - (2.0 * 10.0 + 3.0)).abs() < 1e-6);
    assert_eq!(predictions[0].model, ModelKind::Linear);
}

#[test]
fn trend_direction_classification() {
    let rising: Vec<f64> = (0..20)
        .map(|i| 100.0 + 10.0 * i as f64 + if i % 2 == 0 { 2.0 } else { -2.0 })
        .collect();
    let trend = PredictionEngine::new().analyze_trend(&daily("r", &rising)).unwrap();
    assert!(trend.r_squared > 0.9);
    assert_eq!(trend.direction, TrendDirection::Increasing);

    let alternating: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 50.0 } else { 150.0 }).collect();
    let trend = PredictionEngine::new().analyze_trend(&daily("a", &alternating)).unwrap();
    assert_eq!(trend.direction, TrendDirection::Volatile);
}

#[test]
fn short_inputs_return_empty_results() {
    let anomalies = AnomalyDetector::new()
        .detect_anomalies(&daily("x", &[1.0, 50.0, 1.0]), &DetectionOptions::default())
        .unwrap();
    assert!(anomalies.is_empty());

    let predictions = PredictionEngine::new()
        .predict(&daily("x", &[1.0, 2.0]), &PredictionOptions::default())
        .unwrap();
    assert!(predictions.is_empty());
}

#[test]
fn lone_monthly_spike_is_high_or_critical() {
    let series = monthly("ventes", &[10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0]);
    let found = AnomalyDetector::new()
        .detect_anomalies(&series, &DetectionOptions::default())
        .unwrap();

    let spike = found
        .iter()
        .find(|a| a.timestamp == series.data[5].timestamp && a.kind == AnomalyKind::Spike)
        .expect("spike at index 5");
    assert!(matches!(spike.severity, Severity::Critical | Severity::High));
}

#[test]
fn steady_monthly_growth_forecasts_linearly() {
    let values: Vec<f64> = (0..12).map(|i| 5000.0 + 1000.0 * i as f64).collect();
    let series = monthly("chiffre_affaires", &values);
    let engine = PredictionEngine::new();
    let options = PredictionOptions {
        horizon: 3,
        model: ModelChoice::Auto,
        ..Default::default()
    };

    let predictions = engine.predict(&series, &options).unwrap();
    assert_eq!(predictions.len(), 3);
    for (k, prediction) in predictions.iter().enumerate() {
        assert_eq!(prediction.model, ModelKind::Linear);
        let expected = 17000.0 + 1000.0 * k as f64;
        assert!((prediction.predicted_value - expected).abs() < 1e-6);
    }

    let trend = engine.analyze_trend(&series).unwrap();
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert!((trend.r_squared - 1.0).abs() < 1e-9);
}

#[test]
fn weekly_sawtooth_is_seasonal() {
    let values: Vec<f64> = (0..28).map(|i| 10.0 + 5.0 * (i % 7) as f64).collect();
    let trend = PredictionEngine::new().analyze_trend(&daily("visites", &values)).unwrap();
    assert!(trend.seasonality.detected);
    assert_eq!(trend.seasonality.period, 7);
    assert!((trend.seasonality.amplitude - 15.0).abs() < 1e-9);
}

#[test]
fn insights_cover_every_pass_on_a_rich_series() {
    let mut values: Vec<f64> = (0..30)
        .map(|i| 1000.0 + 40.0 * i as f64 + 80.0 * ((i % 7) as f64 - 3.0))
        .collect();
    values[12] = 6000.0;
    let insights = InsightGenerator::new()
        .generate_insights(&daily("ventes", &values), &InsightOptions::default())
        .unwrap();

    let kinds: Vec<_> = insights.iter().map(|i| i.kind).collect();
    use core_types::InsightKind::*;
    for expected in [Trend, Anomaly, Prediction, Comparison, Recommendation] {
        assert!(kinds.contains(&expected), "missing {expected:?} in {kinds:?}");
    }
    assert!(insights.windows(2).all(|w| w[0].priority >= w[1].priority));
}

#[test]
fn anomaly_json_uses_camel_case_and_type_field() {
    let series = monthly("ventes", &[10.0, 10.0, 10.0, 10.0, 10.0, 100.0, 10.0, 10.0, 10.0, 10.0]);
    let found = AnomalyDetector::new()
        .detect_anomalies(&series, &DetectionOptions::default())
        .unwrap();
    let json = serde_json::to_value(&found[0]).unwrap();
    assert!(json.get("expectedValue").is_some());
    assert!(json.get("suggestedAction").is_some());
    assert!(json.get("type").is_some());
    assert!(json.get("missingCount").is_none());
}
