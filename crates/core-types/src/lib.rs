pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{
    AnomalyKind, DetectionMethod, InsightKind, MetricStatus, MetricTrend, ModelChoice, ModelKind,
    Priority, Severity, TrendDirection,
};
pub use error::CoreError;
pub use structs::{DataPoint, DataSeries};
