use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a detected anomaly is. Variants are declared in ascending order,
/// so the derived `Ord` ranks `Critical` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Spike,
    Drop,
    Outlier,
    TrendBreak,
    Missing,
}

impl AnomalyKind {
    /// A short French label used in generated texts.
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::Spike => "pic",
            AnomalyKind::Drop => "chute",
            AnomalyKind::Outlier => "valeur aberrante",
            AnomalyKind::TrendBreak => "rupture de tendance",
            AnomalyKind::Missing => "données manquantes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

/// A fitted regression model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Polynomial,
    Exponential,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelKind::Linear => "linear",
            ModelKind::Polynomial => "polynomial",
            ModelKind::Exponential => "exponential",
        };
        f.write_str(name)
    }
}

/// The model requested by a caller: a fixed family, or automatic selection by R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    #[default]
    Auto,
    Linear,
    Polynomial,
    Exponential,
}

impl ModelChoice {
    /// Returns the fixed model family, or `None` for `Auto`.
    pub fn fixed(&self) -> Option<ModelKind> {
        match self {
            ModelChoice::Auto => None,
            ModelChoice::Linear => Some(ModelKind::Linear),
            ModelChoice::Polynomial => Some(ModelKind::Polynomial),
            ModelChoice::Exponential => Some(ModelKind::Exponential),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Zscore,
    Iqr,
    Isolation,
    TrendBreak,
    #[default]
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    Anomaly,
    Prediction,
    Comparison,
    Recommendation,
}

/// Insight priority. Declared in ascending order so that the derived `Ord`
/// gives `Critical > Action > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Info,
    Warning,
    Action,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTrend {
    Up,
    Down,
    Stable,
}

impl MetricTrend {
    /// Classifies a signed change; anything strictly inside `±tolerance` is stable.
    pub fn from_change(change: f64, tolerance: f64) -> Self {
        if change > tolerance {
            MetricTrend::Up
        } else if change < -tolerance {
            MetricTrend::Down
        } else {
            MetricTrend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Good,
    Bad,
    Neutral,
}
