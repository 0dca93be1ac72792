use crate::error::ConfigError;
use crate::options::{DetectionOptions, InsightOptions, PredictionOptions};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default anomaly detection options for callers that do not pass their own.
    pub detection: DetectionOptions,
    /// Default forecasting options.
    pub prediction: PredictionOptions,
    /// Default insight passes.
    pub insights: InsightOptions,
    pub server: Server,
    pub logging: Logging,
}

impl Settings {
    /// Validates every section that carries constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        self.prediction.validate()?;
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Contains parameters for the HTTP transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Contains parameters for log output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// An `EnvFilter` directive such as `info` or `analytics=debug`.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
