use crate::anomaly::AnomalyDetector;
use crate::error::AnalyticsError;
use crate::prediction::{PredictionEngine, residual_variation};
use crate::regression::LinearFit;
use crate::report::{ActionKind, Anomaly, Insight, InsightMetric, Prediction, Trend};
use crate::stats::{DescriptiveStats, StatisticsEngine, mean};
use crate::strategies::relative_pct;
use chrono::{DateTime, Duration, Utc};
use configuration::{DetectionOptions, InsightOptions, PredictionOptions};
use core_types::{AnomalyKind, DataSeries, InsightKind, Priority, Severity, TrendDirection};
use std::collections::BTreeMap;

/// Turns the numeric analyses of a series into prioritised, readable insights.
#[derive(Debug, Default)]
pub struct InsightGenerator {
    detector: AnomalyDetector,
    engine: PredictionEngine,
    stats: StatisticsEngine,
    detection: DetectionOptions,
    prediction: PredictionOptions,
}

impl InsightGenerator {
    /// Comparison insights need at least this many points.
    pub const MIN_COMPARISON_POINTS: usize = 10;

    const TOTAL_CHANGE_ACTION_PCT: f64 = 50.0;
    const ACCELERATION_THRESHOLD: f64 = 0.05;
    const ANOMALY_SUMMARY_THRESHOLD: usize = 3;
    const PREDICTION_ACTION_PCT: f64 = 20.0;
    const HALVES_ACTION_PCT: f64 = 30.0;
    const NEAR_PEAK_PCT: f64 = 10.0;
    const NEAR_TROUGH_PCT: f64 = 20.0;
    const GROWTH_R_SQUARED: f64 = 0.7;
    const ANOMALY_TTL_HOURS: i64 = 24;

    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the given detection and prediction options for every insight run.
    pub fn with_options(detection: DetectionOptions, prediction: PredictionOptions) -> Self {
        Self {
            detection,
            prediction,
            ..Self::default()
        }
    }

    /// Replaces the anomaly detector, e.g. one carrying extra strategies.
    pub fn with_detector(mut self, detector: AnomalyDetector) -> Self {
        self.detector = detector;
        self
    }

    /// The main entry point for insight generation.
    ///
    /// Runs the enabled passes (trends, anomalies, predictions, comparisons), then a
    /// recommendations pass over all signals. The result is sorted
    /// `critical > action > warning > info`; insights of equal priority keep the
    /// order in which their passes produced them.
    pub fn generate_insights(
        &self,
        series: &DataSeries,
        options: &InsightOptions,
    ) -> Result<Vec<Insight>, AnalyticsError> {
        series.validate()?;
        let values = series.values();
        let Some(stats) = self.stats.describe(&values) else {
            return Ok(Vec::new());
        };

        let now = Utc::now();
        let trend = self.engine.trend_of(&values);
        let mut insights = Vec::new();

        if options.include_trends {
            insights.extend(self.trend_insights(series, &stats, &trend, now));
        }
        if options.include_anomalies {
            let anomalies = self.detector.detect_anomalies(series, &self.detection)?;
            insights.extend(self.anomaly_insights(&anomalies, now));
        }
        if options.include_predictions {
            let predictions = self.engine.predict(series, &self.prediction)?;
            insights.extend(self.prediction_insights(series, &predictions, now));
        }
        if options.include_comparisons {
            insights.extend(self.comparison_insights(series, &values, &stats, now));
        }
        insights.extend(self.recommendation_insight(series, &values, &trend, now));

        insights.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::info!(
            series = %series.name,
            insights = insights.len(),
            "Insight generation completed."
        );
        Ok(insights)
    }

    fn trend_insights(
        &self,
        series: &DataSeries,
        stats: &DescriptiveStats,
        trend: &Trend,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Vec::new();
        };
        if series.len() < 2 {
            return Vec::new();
        }
        let mut insights = Vec::new();

        if trend.direction != TrendDirection::Stable {
            let change = relative_pct(last.value, first.value);
            let title = match trend.direction {
                TrendDirection::Increasing => format!("Tendance haussière de {}", series.name),
                TrendDirection::Decreasing => format!("Tendance baissière de {}", series.name),
                _ => format!("Évolution irrégulière de {}", series.name),
            };
            let priority = if change.abs() > Self::TOTAL_CHANGE_ACTION_PCT {
                Priority::Action
            } else {
                Priority::Info
            };
            insights.push(
                Insight::new(
                    InsightKind::Trend,
                    priority,
                    title,
                    format!(
                        "{} a varié de {:+.1}% entre le {} et le {} (pente {:.2} par période, \
                        R² {:.2}).",
                        series.name,
                        change,
                        first.timestamp.format("%Y-%m-%d"),
                        last.timestamp.format("%Y-%m-%d"),
                        trend.slope,
                        trend.r_squared
                    ),
                    now,
                )
                .with_metric(InsightMetric::new("Variation totale", last.value).with_change(change))
                .with_metric(InsightMetric::new("Pente", trend.slope))
                .with_metric(InsightMetric::new("R²", trend.r_squared)),
            );
        }

        if trend.acceleration.abs() > Self::ACCELERATION_THRESHOLD {
            let accelerating = trend.acceleration > 0.0;
            let (title, priority, verb) = if accelerating {
                ("Accélération de la dynamique", Priority::Info, "s'accélère")
            } else {
                ("Ralentissement de la dynamique", Priority::Warning, "ralentit")
            };
            insights.push(
                Insight::new(
                    InsightKind::Trend,
                    priority,
                    title,
                    format!(
                        "Le rythme de variation de {} {} : {:+.1} points de pourcentage par \
                        période entre la première et la seconde moitié.",
                        series.name,
                        verb,
                        trend.acceleration * 100.0
                    ),
                    now,
                )
                .with_metric(InsightMetric::new("Accélération", trend.acceleration * 100.0)),
            );
        }

        if trend.direction == TrendDirection::Volatile {
            let values = series.values();
            let scatter = residual_variation(&values, &LinearFit::fit(&values));
            insights.push(
                Insight::new(
                    InsightKind::Trend,
                    Priority::Warning,
                    "Forte volatilité",
                    format!(
                        "{} fluctue fortement autour de sa tendance (coefficient de variation \
                        {:.0}%).",
                        series.name,
                        scatter * 100.0
                    ),
                    now,
                )
                .with_metric(InsightMetric::new("Coefficient de variation", scatter * 100.0))
                .with_metric(InsightMetric::new("Écart-type", stats.standard_deviation))
                .with_action("Surveiller les écarts de près", ActionKind::Monitor),
            );
        }

        if trend.seasonality.detected {
            insights.push(
                Insight::new(
                    InsightKind::Trend,
                    Priority::Info,
                    "Cycle saisonnier détecté",
                    format!(
                        "{} suit un cycle d'environ {} périodes avec une amplitude de {:.2}.",
                        series.name, trend.seasonality.period, trend.seasonality.amplitude
                    ),
                    now,
                )
                .with_metric(InsightMetric::new("Période", trend.seasonality.period as f64))
                .with_metric(InsightMetric::new("Amplitude", trend.seasonality.amplitude))
                .with_action("Anticiper les prochains pics du cycle", ActionKind::Plan),
            );
        }

        insights
    }

    fn anomaly_insights(&self, anomalies: &[Anomaly], now: DateTime<Utc>) -> Vec<Insight> {
        let mut insights = Vec::new();
        let expires_at = now + Duration::hours(Self::ANOMALY_TTL_HOURS);

        let critical: Vec<&Anomaly> = anomalies
            .iter()
            .filter(|a| a.severity == Severity::Critical)
            .collect();
        let high: Vec<&Anomaly> = anomalies
            .iter()
            .filter(|a| a.severity == Severity::High)
            .collect();

        if !critical.is_empty() {
            insights.push(
                Insight::new(
                    InsightKind::Anomaly,
                    Priority::Critical,
                    format!("{} anomalie(s) critique(s) détectée(s)", critical.len()),
                    describe_anomalies(&critical),
                    now,
                )
                .with_metric(InsightMetric::new("Anomalies critiques", critical.len() as f64))
                .with_action("Investiguer immédiatement", ActionKind::Investigate)
                .expiring_at(expires_at),
            );
        } else if !high.is_empty() {
            insights.push(
                Insight::new(
                    InsightKind::Anomaly,
                    Priority::Action,
                    format!("{} anomalie(s) importante(s) détectée(s)", high.len()),
                    describe_anomalies(&high),
                    now,
                )
                .with_metric(InsightMetric::new("Anomalies importantes", high.len() as f64))
                .with_action("Analyser les points signalés", ActionKind::Investigate)
                .expiring_at(expires_at),
            );
        }

        if anomalies.len() > Self::ANOMALY_SUMMARY_THRESHOLD {
            let mut counts: BTreeMap<AnomalyKind, usize> = BTreeMap::new();
            for anomaly in anomalies {
                *counts.entry(anomaly.kind).or_insert(0) += 1;
            }
            let breakdown: Vec<String> = counts
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind.label()))
                .collect();
            let average_confidence =
                anomalies.iter().map(|a| a.confidence).sum::<f64>() / anomalies.len() as f64;

            insights.push(
                Insight::new(
                    InsightKind::Anomaly,
                    Priority::Info,
                    "Synthèse des anomalies",
                    format!(
                        "{} anomalies au total ({}), confiance moyenne {:.0}%.",
                        anomalies.len(),
                        breakdown.join(", "),
                        average_confidence * 100.0
                    ),
                    now,
                )
                .with_metric(InsightMetric::new("Anomalies", anomalies.len() as f64))
                .with_metric(InsightMetric::new("Confiance moyenne", average_confidence * 100.0))
                .expiring_at(expires_at),
            );
        }

        insights
    }

    fn prediction_insights(
        &self,
        series: &DataSeries,
        predictions: &[Prediction],
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        let (Some(final_prediction), Some(current)) = (predictions.last(), series.last()) else {
            return Vec::new();
        };
        let change = relative_pct(final_prediction.predicted_value, current.value);
        let priority = if change.abs() > Self::PREDICTION_ACTION_PCT {
            Priority::Action
        } else {
            Priority::Info
        };
        let title = if change >= 0.0 {
            format!("Hausse prévue de {}", series.name)
        } else {
            format!("Baisse prévue de {}", series.name)
        };

        let forecast = Insight::new(
            InsightKind::Prediction,
            priority,
            title,
            format!(
                "Le modèle {} prévoit {:.2} au {} ({:+.1}% par rapport à la dernière valeur), \
                intervalle [{:.2}, {:.2}], confiance {:.0}%.",
                final_prediction.model,
                final_prediction.predicted_value,
                final_prediction.target_date.format("%Y-%m-%d"),
                change,
                final_prediction.lower_bound,
                final_prediction.upper_bound,
                final_prediction.confidence * 100.0
            ),
            now,
        )
        .with_metric(
            InsightMetric::new("Valeur prévue", final_prediction.predicted_value)
                .with_change(change),
        )
        .with_metric(InsightMetric::new("Confiance", final_prediction.confidence * 100.0))
        .expiring_at(final_prediction.target_date);

        let mut factors = final_prediction.factors.clone();
        factors.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
        factors.truncate(3);
        let listed: Vec<String> = factors
            .iter()
            .map(|f| format!("{} ({:+.1}%)", f.name, f.impact))
            .collect();
        let drivers = factors.iter().fold(
            Insight::new(
                InsightKind::Prediction,
                Priority::Info,
                "Facteurs d'influence de la prévision",
                format!("Principaux facteurs : {}.", listed.join(", ")),
                now,
            )
            .expiring_at(final_prediction.target_date),
            |insight, factor| {
                insight.with_metric(InsightMetric::new(factor.name.clone(), factor.impact))
            },
        );

        vec![forecast, drivers]
    }

    fn comparison_insights(
        &self,
        series: &DataSeries,
        values: &[f64],
        stats: &DescriptiveStats,
        now: DateTime<Utc>,
    ) -> Vec<Insight> {
        if values.len() < Self::MIN_COMPARISON_POINTS {
            return Vec::new();
        }
        let mut insights = Vec::new();

        let mid = values.len() / 2;
        let earlier = mean(&values[..mid]);
        let recent = mean(&values[mid..]);
        let change = relative_pct(recent, earlier);
        let priority = if change.abs() > Self::HALVES_ACTION_PCT {
            Priority::Action
        } else {
            Priority::Info
        };
        insights.push(
            Insight::new(
                InsightKind::Comparison,
                priority,
                "Comparaison entre périodes",
                format!(
                    "La moyenne récente de {} ({:.2}) est {:+.1}% par rapport à la période \
                    précédente ({:.2}).",
                    series.name, recent, change, earlier
                ),
                now,
            )
            .with_metric(InsightMetric::new("Moyenne récente", recent).with_change(change))
            .with_metric(InsightMetric::new("Moyenne antérieure", earlier)),
        );

        let current = values[values.len() - 1];
        if stats.max > 0.0 {
            let below_peak = (stats.max - current) / stats.max * 100.0;
            if below_peak < Self::NEAR_PEAK_PCT {
                insights.push(
                    Insight::new(
                        InsightKind::Comparison,
                        Priority::Action,
                        "Proche du plus haut historique",
                        format!(
                            "{} ({:.2}) est à {:.1}% de son maximum historique ({:.2}).",
                            series.name, current, below_peak, stats.max
                        ),
                        now,
                    )
                    .with_metric(InsightMetric::new("Maximum historique", stats.max))
                    .with_metric(InsightMetric::new("Écart au maximum", below_peak)),
                );
            }
        }
        if stats.min > 0.0 {
            let above_trough = (current - stats.min) / stats.min * 100.0;
            if above_trough < Self::NEAR_TROUGH_PCT {
                insights.push(
                    Insight::new(
                        InsightKind::Comparison,
                        Priority::Warning,
                        "Proche du plus bas historique",
                        format!(
                            "{} ({:.2}) n'est qu'à {:.1}% au-dessus de son minimum historique \
                            ({:.2}).",
                            series.name, current, above_trough, stats.min
                        ),
                        now,
                    )
                    .with_metric(InsightMetric::new("Minimum historique", stats.min))
                    .with_metric(InsightMetric::new("Écart au minimum", above_trough)),
                );
            }
        }

        insights
    }

    fn recommendation_insight(
        &self,
        series: &DataSeries,
        values: &[f64],
        trend: &Trend,
        now: DateTime<Utc>,
    ) -> Option<Insight> {
        let current = *values.last()?;
        let mut recommendations: Vec<(String, ActionKind)> = Vec::new();

        match trend.direction {
            TrendDirection::Increasing if trend.r_squared > Self::GROWTH_R_SQUARED => {
                recommendations.push((
                    "Maintenir les leviers de croissance actuels".to_string(),
                    ActionKind::Optimize,
                ));
            }
            TrendDirection::Decreasing => recommendations.push((
                "Analyser les causes de la baisse et ajuster la stratégie".to_string(),
                ActionKind::Investigate,
            )),
            TrendDirection::Volatile => recommendations.push((
                "Stabiliser l'activité en lissant les approvisionnements".to_string(),
                ActionKind::Monitor,
            )),
            _ => {}
        }
        if trend.seasonality.detected {
            recommendations.push((
                format!(
                    "Planifier les ressources autour du cycle de {} périodes",
                    trend.seasonality.period
                ),
                ActionKind::Plan,
            ));
        }

        let rank = values.iter().filter(|v| **v <= current).count() as f64 / values.len() as f64;
        if values.len() > 1 && rank >= 0.8 {
            recommendations.push((
                "Consolider les acquis : le niveau actuel figure parmi les plus élevés".to_string(),
                ActionKind::Review,
            ));
        } else if values.len() > 1 && rank <= 0.2 {
            recommendations.push((
                "Mettre en place un plan de redressement : le niveau actuel figure parmi les \
                plus bas"
                    .to_string(),
                ActionKind::Investigate,
            ));
        }

        if recommendations.is_empty() {
            return None;
        }

        let labels: Vec<&str> = recommendations.iter().map(|(label, _)| label.as_str()).collect();
        let description = format!("{}.", labels.join(" ; "));
        Some(recommendations.into_iter().fold(
            Insight::new(
                InsightKind::Recommendation,
                Priority::Action,
                format!("Recommandations pour {}", series.name),
                description,
                now,
            ),
            |insight, (label, kind)| insight.with_action(label, kind),
        ))
    }
}

/// Lists up to three anomalies in a sentence.
fn describe_anomalies(anomalies: &[&Anomaly]) -> String {
    let listed: Vec<String> = anomalies
        .iter()
        .take(3)
        .map(|a| {
            format!(
                "{} le {} (valeur {:.2}, écart {:+.1}%)",
                a.kind.label(),
                a.timestamp.format("%Y-%m-%d"),
                a.value,
                a.deviation
            )
        })
        .collect();
    let more = anomalies.len().saturating_sub(listed.len());
    if more > 0 {
        format!("{} et {} autre(s).", listed.join(", "), more)
    } else {
        format!("{}.", listed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{DetectionStrategy, SeriesContext, new_anomaly};
    use chrono::TimeZone;
    use core_types::DataPoint;

    fn monthly(name: &str, values: &[f64]) -> DataSeries {
        DataSeries::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let month = (i % 12) as u32 + 1;
                    let year = 2023 + (i / 12) as i32;
                    DataPoint::new(Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap(), v)
                })
                .collect(),
        )
    }

    fn only(kind: InsightKind, insights: &[Insight]) -> Vec<&Insight> {
        insights.iter().filter(|i| i.kind == kind).collect()
    }

    #[test]
    fn strong_growth_yields_action_trend() {
        let values: Vec<f64> = (0..12).map(|i| 1000.0 + 200.0 * i as f64).collect();
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("CA", &values), &InsightOptions::default())
            .unwrap();
        let trends = only(InsightKind::Trend, &insights);
        let headline = trends
            .iter()
            .find(|i| i.title.starts_with("Tendance haussière"))
            .expect("headline trend insight");
        // 1000 -> 3200 is +220%
        assert_eq!(headline.priority, Priority::Action);
        assert_eq!(headline.metrics[0].change.map(|c| c.round()), Some(220.0));
    }

    #[test]
    fn critical_anomalies_are_bundled() {
        let mut values = vec![100.0; 30];
        values[10] = 1000.0;
        values[20] = 950.0;
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("stock", &values), &InsightOptions::default())
            .unwrap();
        let anomalies = only(InsightKind::Anomaly, &insights);
        let critical: Vec<_> = anomalies
            .iter()
            .filter(|i| i.priority == Priority::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        assert!(critical[0].expires_at.is_some());
        assert_eq!(insights[0].priority, Priority::Critical);
    }

    #[test]
    fn disabled_passes_produce_nothing() {
        let values: Vec<f64> = (0..20).map(|i| 50.0 + (i % 3) as f64).collect();
        let options = InsightOptions {
            include_anomalies: false,
            include_predictions: false,
            include_trends: false,
            include_comparisons: false,
        };
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("x", &values), &options)
            .unwrap();
        assert!(insights.iter().all(|i| i.kind == InsightKind::Recommendation));
    }

    #[test]
    fn prediction_pass_reports_final_horizon_and_factors() {
        let values: Vec<f64> = (0..8).map(|i| 100.0 + 10.0 * i as f64).collect();
        let options = InsightOptions {
            include_anomalies: false,
            include_trends: false,
            include_comparisons: false,
            include_predictions: true,
        };
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("commandes", &values), &options)
            .unwrap();
        let predictions = only(InsightKind::Prediction, &insights);
        assert_eq!(predictions.len(), 2);
        // Last value 170, forecast at step 5 is 220: +29% -> action.
        let forecast = predictions.iter().find(|i| i.title.starts_with("Hausse")).unwrap();
        assert_eq!(forecast.priority, Priority::Action);
        let drivers = predictions.iter().find(|i| i.title.starts_with("Facteurs")).unwrap();
        assert!(drivers.metrics.len() <= 3);
    }

    #[test]
    fn comparison_flags_near_peak() {
        let values: Vec<f64> = (0..12).map(|i| 100.0 + 10.0 * i as f64).collect();
        let options = InsightOptions {
            include_anomalies: false,
            include_predictions: false,
            include_trends: false,
            include_comparisons: true,
        };
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("ventes", &values), &options)
            .unwrap();
        assert!(insights.iter().any(|i| i.title == "Proche du plus haut historique"));
        assert!(!insights.iter().any(|i| i.title == "Proche du plus bas historique"));
    }

    #[test]
    fn comparison_flags_near_trough() {
        let values: Vec<f64> = (0..12).map(|i| 300.0 - 15.0 * i as f64).collect();
        let options = InsightOptions {
            include_anomalies: false,
            include_predictions: false,
            include_trends: false,
            include_comparisons: true,
        };
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("ventes", &values), &options)
            .unwrap();
        let trough = insights
            .iter()
            .find(|i| i.title == "Proche du plus bas historique")
            .expect("near trough");
        assert_eq!(trough.priority, Priority::Warning);
    }

    #[test]
    fn comparisons_need_ten_points() {
        let values: Vec<f64> = (0..9).map(|i| 100.0 + 50.0 * i as f64).collect();
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("court", &values), &InsightOptions::default())
            .unwrap();
        assert!(only(InsightKind::Comparison, &insights).is_empty());
    }

    #[test]
    fn recommendations_mirror_actions() {
        let values: Vec<f64> = (0..12).map(|i| 500.0 - 20.0 * i as f64).collect();
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("marge", &values), &InsightOptions::default())
            .unwrap();
        let recommendation = only(InsightKind::Recommendation, &insights)
            .into_iter()
            .next()
            .expect("recommendation insight");
        assert_eq!(recommendation.priority, Priority::Action);
        let labels: Vec<&str> = recommendation.actions.iter().map(|a| a.label.as_str()).collect();
        assert!(labels.iter().any(|l| l.starts_with("Analyser les causes de la baisse")));
        assert!(labels.iter().any(|l| l.starts_with("Mettre en place un plan de redressement")));
        for label in labels {
            assert!(recommendation.description.contains(label));
        }
    }

    #[test]
    fn empty_series_has_no_insights() {
        let insights = InsightGenerator::new()
            .generate_insights(&DataSeries::new("vide", vec![]), &InsightOptions::default())
            .unwrap();
        assert!(insights.is_empty());
    }

    #[test]
    fn volatility_reports_scatter_around_the_trend() {
        let values: Vec<f64> = (0..10)
            .map(|i| 100.0 + 30.0 * i as f64 + if i % 2 == 0 { 100.0 } else { -100.0 })
            .collect();
        let insights = InsightGenerator::new()
            .generate_insights(&monthly("marge", &values), &InsightOptions::default())
            .unwrap();
        let volatility = only(InsightKind::Trend, &insights)
            .into_iter()
            .find(|i| i.title == "Forte volatilité")
            .expect("volatility insight");
        let cv = volatility
            .metrics
            .iter()
            .find(|m| m.name == "Coefficient de variation")
            .unwrap();
        // Residual scatter is 41.9% of the mean; the raw coefficient of variation is 51.1%.
        assert!((cv.value - 41.9).abs() < 0.1, "cv {}", cv.value);
        assert!(volatility.description.contains("42%"));
    }

    struct LastPointAlarm;

    impl DetectionStrategy for LastPointAlarm {
        fn name(&self) -> &'static str {
            "last_point_alarm"
        }

        fn detect(&self, context: &SeriesContext<'_>) -> Vec<Anomaly> {
            context
                .series
                .last()
                .map(|p| {
                    new_anomaly(
                        p,
                        context.stats.mean,
                        0.0,
                        Severity::Critical,
                        AnomalyKind::Outlier,
                        0.9,
                        "alerte".to_string(),
                        "Vérifier la saisie",
                    )
                })
                .into_iter()
                .collect()
        }
    }

    #[test]
    fn injected_detector_feeds_anomaly_insights() {
        let values: Vec<f64> = (0..12).map(|i| 100.0 + 10.0 * i as f64).collect();
        let series = monthly("commandes", &values);

        let plain = InsightGenerator::new()
            .generate_insights(&series, &InsightOptions::default())
            .unwrap();
        assert!(plain.iter().all(|i| i.priority != Priority::Critical));

        let insights = InsightGenerator::new()
            .with_detector(AnomalyDetector::new().with_strategy(LastPointAlarm))
            .generate_insights(&series, &InsightOptions::default())
            .unwrap();
        let first = &insights[0];
        assert_eq!(first.kind, InsightKind::Anomaly);
        assert_eq!(first.priority, Priority::Critical);
        assert_eq!(first.title, "1 anomalie(s) critique(s) détectée(s)");
    }
}
