use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod options;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use options::{DetectionOptions, InsightOptions, PredictionOptions, SummaryOptions};
pub use settings::{Logging, Server, Settings};

/// Loads the application settings.
///
/// The file at `path` is optional; any value it does not provide falls back to the
/// defaults. Environment variables prefixed with `PULSE__` override both, using a
/// double underscore between nested keys (e.g. `PULSE__SERVER__PORT=8080`).
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("PULSE")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(settings)
}
