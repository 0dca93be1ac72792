use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation of a business metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A named, time-ordered sequence of observations.
///
/// The analytics core never sorts a series; callers are expected to supply points
/// with non-decreasing timestamps, which `validate` checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSeries {
    pub name: String,
    #[serde(default)]
    pub data: Vec<DataPoint>,
}

impl DataSeries {
    pub fn new(name: impl Into<String>, data: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Checks that timestamps never go backwards and that every value is finite.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (index, point) in self.data.iter().enumerate() {
            if !point.value.is_finite() {
                return Err(CoreError::NonFiniteValue {
                    series: self.name.clone(),
                    index,
                });
            }
            if index > 0 && point.timestamp < self.data[index - 1].timestamp {
                return Err(CoreError::InvalidSeries {
                    series: self.name.clone(),
                    index,
                });
            }
        }
        Ok(())
    }

    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.data.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.data.last()
    }

    /// The mean spacing between consecutive timestamps, in milliseconds.
    ///
    /// Returns `None` for series with fewer than two points.
    pub fn average_interval_ms(&self) -> Option<f64> {
        if self.data.len() < 2 {
            return None;
        }
        let total: i64 = self
            .data
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds())
            .sum();
        Some(total as f64 / (self.data.len() - 1) as f64)
    }
}
