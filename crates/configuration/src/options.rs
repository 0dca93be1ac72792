use crate::error::ConfigError;
use core_types::{DetectionMethod, ModelChoice};
use serde::{Deserialize, Serialize};

/// Per-call options for anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    /// Z-score above which a point is flagged.
    pub threshold: f64,
    pub method: DetectionMethod,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            threshold: 2.5,
            method: DetectionMethod::Combined,
        }
    }
}

impl DetectionOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "detection threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Per-call options for forecasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionOptions {
    /// Number of future periods to forecast.
    pub horizon: usize,
    pub model: ModelChoice,
    /// Two-sided confidence level for the prediction interval (0.90, 0.95 or 0.99).
    #[serde(alias = "confidenceLevel")]
    pub confidence_level: f64,
}

impl Default for PredictionOptions {
    fn default() -> Self {
        Self {
            horizon: 5,
            model: ModelChoice::Auto,
            confidence_level: 0.95,
        }
    }
}

impl PredictionOptions {
    /// The longest forecast a single call may request.
    pub const MAX_HORIZON: usize = 365;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon > Self::MAX_HORIZON {
            return Err(ConfigError::ValidationError(format!(
                "prediction horizon must be at most {}, got {}",
                Self::MAX_HORIZON,
                self.horizon
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "confidence level must be strictly between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        Ok(())
    }
}

/// Which analysis passes `generate_insights` runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightOptions {
    #[serde(alias = "includeAnomalies")]
    pub include_anomalies: bool,
    #[serde(alias = "includePredictions")]
    pub include_predictions: bool,
    #[serde(alias = "includeTrends")]
    pub include_trends: bool,
    #[serde(alias = "includeComparisons")]
    pub include_comparisons: bool,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            include_anomalies: true,
            include_predictions: true,
            include_trends: true,
            include_comparisons: true,
        }
    }
}

/// Options for an executive summary. Without a `period`, the covered date span is used.
/// `insights` selects the passes run on each series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    pub period: Option<String>,
    pub insights: InsightOptions,
}
