//! # Pulse Analytics Engine
//!
//! This crate turns raw business time series (sales, stock levels, orders) into
//! statistics, anomaly flags, trend characterisations, forecasts and readable insights.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of storage or
//!   transport. It depends only on `core-types` and `configuration` (Layer 0).
//! - **Stateless Calculation:** Every component takes a `DataSeries` snapshot and
//!   returns fresh results. Nothing is carried between calls apart from generated ids,
//!   so any component can be shared freely across threads.
//! - **Graceful Degradation:** Series that are too short for an analysis yield an
//!   empty result, not an error. Errors are reserved for malformed input
//!   (timestamps going backwards, non-finite values, invalid options).
//!
//! ## Pipeline
//!
//! `StatisticsEngine` ← `AnomalyDetector`, `PredictionEngine` ← `InsightGenerator`
//!
//! ## Public API
//!
//! - `StatisticsEngine` / `DescriptiveStats`: descriptive statistics and percentiles.
//! - `AnomalyDetector` / `DetectionStrategy`: multi-strategy anomaly detection.
//! - `PredictionEngine`: model fitting, forecasting and trend analysis.
//! - `InsightGenerator`: insights and executive summaries.
//! - `AnalyticsError`: the error type returned from this crate.

// Declare the modules that constitute this crate.
pub mod anomaly;
pub mod error;
pub mod insights;
pub mod prediction;
pub mod regression;
pub mod report;
pub mod stats;
pub mod strategies;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use anomaly::AnomalyDetector;
pub use error::AnalyticsError;
pub use insights::InsightGenerator;
pub use prediction::PredictionEngine;
pub use regression::FittedModel;
pub use report::{
    ActionKind, Anomaly, ExecutiveSummary, Factor, Insight, InsightAction, InsightMetric,
    KeyMetric, Prediction, Seasonality, Trend,
};
pub use stats::{DescriptiveStats, Percentiles, StatisticsEngine, percentile};
pub use strategies::{DetectionStrategy, SeriesContext};
