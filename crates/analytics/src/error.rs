use configuration::ConfigError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid input series: {0}")]
    InvalidSeries(#[from] CoreError),

    #[error("Invalid analysis options: {0}")]
    InvalidOptions(#[from] ConfigError),
}
