use chrono::{DateTime, Utc};
use core_types::{
    AnomalyKind, InsightKind, MetricStatus, MetricTrend, ModelKind, Priority, Severity,
    TrendDirection,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single unusual event in a series, produced by the `AnomalyDetector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub expected_value: f64,
    /// Signed deviation from the expected value, in percent.
    pub deviation: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    /// In `[0, 0.99]`.
    pub confidence: f64,
    pub description: String,
    pub suggested_action: String,
    /// Estimated number of absent points, only set for `missing` anomalies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub detected: bool,
    /// Period in number of points; `0` when nothing was detected.
    pub period: usize,
    pub amplitude: f64,
}

impl Seasonality {
    pub fn none() -> Self {
        Self {
            detected: false,
            period: 0,
            amplitude: 0.0,
        }
    }
}

/// The shape of a series: direction, fit quality, speed and seasonality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    /// Mean relative period-over-period change (0.05 = +5% per period).
    pub change_rate: f64,
    /// Change rate of the second half minus change rate of the first half.
    pub acceleration: f64,
    pub seasonality: Seasonality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    /// Signed contribution, in percent of the series mean per period.
    pub impact: f64,
}

/// A forecast for one future period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: Uuid,
    pub target_date: DateTime<Utc>,
    pub predicted_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
    pub model: ModelKind,
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetric {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<MetricTrend>,
}

impl InsightMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            change: None,
            trend: None,
        }
    }

    /// Attaches a percentage change; the trend arrow is derived from its sign.
    pub fn with_change(mut self, change: f64) -> Self {
        self.change = Some(change);
        self.trend = Some(MetricTrend::from_change(change, 0.0));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Investigate,
    Monitor,
    Plan,
    Optimize,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightAction {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
}

/// A human-readable finding derived from the numeric analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub metrics: Vec<InsightMetric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<InsightAction>,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Insight {
    pub fn new(
        kind: InsightKind,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            priority,
            title: title.into(),
            description: description.into(),
            metrics: Vec::new(),
            actions: Vec::new(),
            generated_at,
            expires_at: None,
        }
    }

    pub fn with_metric(mut self, metric: InsightMetric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, kind: ActionKind) -> Self {
        self.actions.push(InsightAction {
            label: label.into(),
            kind,
        });
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetric {
    pub name: String,
    pub value: f64,
    /// First-to-last change over the series, in percent.
    pub change: f64,
    pub status: MetricStatus,
}

/// A cross-series digest for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub period: String,
    pub highlights: Vec<String>,
    pub key_metrics: Vec<KeyMetric>,
    pub top_insights: Vec<Insight>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
}
