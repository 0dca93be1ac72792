use crate::error::AnalyticsError;
use crate::insights::InsightGenerator;
use crate::report::{ExecutiveSummary, Insight, KeyMetric};
use crate::strategies::relative_pct;
use configuration::SummaryOptions;
use core_types::{DataSeries, InsightKind, MetricStatus, MetricTrend, Priority};

/// Number of insights promoted to highlights.
const TOP_INSIGHTS: usize = 5;
/// First-to-last change beyond which a key metric is rated good or bad.
const STATUS_THRESHOLD_PCT: f64 = 10.0;

/// Whether an insight reads as a risk or an opportunity for the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Risk,
    Opportunity,
    Neutral,
}

fn polarity(insight: &Insight) -> Polarity {
    let trends = || insight.metrics.iter().filter_map(|m| m.trend);
    if matches!(insight.priority, Priority::Critical | Priority::Warning)
        || insight.kind == InsightKind::Anomaly
        || trends().any(|t| t == MetricTrend::Down)
    {
        Polarity::Risk
    } else if trends().any(|t| t == MetricTrend::Up) {
        Polarity::Opportunity
    } else {
        Polarity::Neutral
    }
}

fn status_of(change: f64) -> MetricStatus {
    if change > STATUS_THRESHOLD_PCT {
        MetricStatus::Good
    } else if change < -STATUS_THRESHOLD_PCT {
        MetricStatus::Bad
    } else {
        MetricStatus::Neutral
    }
}

impl InsightGenerator {
    /// Builds a cross-series digest from the insights of every series.
    ///
    /// Each series contributes a key metric and its single most urgent insight,
    /// filed as a risk or an opportunity. The five most urgent insights overall
    /// become the highlights.
    pub fn generate_executive_summary(
        &self,
        series: &[DataSeries],
        options: &SummaryOptions,
    ) -> Result<ExecutiveSummary, AnalyticsError> {
        let mut key_metrics = Vec::new();
        let mut risks = Vec::new();
        let mut opportunities = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();
        let mut ranked: Vec<(String, Insight)> = Vec::new();

        for s in series {
            let insights = self.generate_insights(s, &options.insights)?;

            if let (Some(first), Some(last)) = (s.first(), s.last()) {
                let change = relative_pct(last.value, first.value);
                key_metrics.push(KeyMetric {
                    name: s.name.clone(),
                    value: last.value,
                    change,
                    status: status_of(change),
                });
            }

            if let Some(top) = insights.first() {
                let line = format!("{} : {}", s.name, top.title);
                match polarity(top) {
                    Polarity::Risk => risks.push(line),
                    Polarity::Opportunity => opportunities.push(line),
                    Polarity::Neutral => {}
                }
            }

            for insight in insights.iter().filter(|i| i.kind == InsightKind::Recommendation) {
                for action in &insight.actions {
                    if !recommendations.contains(&action.label) {
                        recommendations.push(action.label.clone());
                    }
                }
            }

            ranked.extend(insights.into_iter().map(|i| (s.name.clone(), i)));
        }

        ranked.sort_by(|a, b| b.1.priority.cmp(&a.1.priority));
        ranked.truncate(TOP_INSIGHTS);
        let highlights = ranked
            .iter()
            .map(|(name, insight)| format!("[{}] {}", name, insight.title))
            .collect();
        let top_insights = ranked.into_iter().map(|(_, insight)| insight).collect();

        let period = options.period.clone().unwrap_or_else(|| covered_period(series));

        tracing::info!(
            series = series.len(),
            risks = risks.len(),
            opportunities = opportunities.len(),
            "Executive summary generated."
        );

        Ok(ExecutiveSummary {
            period,
            highlights,
            key_metrics,
            top_insights,
            risks,
            opportunities,
            recommendations,
        })
    }
}

/// `YYYY-MM-DD → YYYY-MM-DD` spanning every series.
fn covered_period(series: &[DataSeries]) -> String {
    let start = series.iter().filter_map(|s| s.first()).map(|p| p.timestamp).min();
    let end = series.iter().filter_map(|s| s.last()).map(|p| p.timestamp).max();
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "{} → {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        _ => "Aucune donnée".to_string(),
    }
}
