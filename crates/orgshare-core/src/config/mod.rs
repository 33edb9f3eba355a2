//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod propagation;

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

pub use self::logging::LoggingConfig;
pub use self::propagation::PropagationConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Background propagation settings.
    #[serde(default)]
    pub propagation: PropagationConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `{dir}/default.toml` with an environment-specific overlay
    /// `{dir}/{env}.toml` and environment variables prefixed with
    /// `ORGSHARE__`. Missing files are tolerated; every field has a default.
    pub fn load(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ORGSHARE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        debug!(dir, env, "Configuration loaded");
        Ok(loaded)
    }

    /// Load a single explicit TOML file, without overlays.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        debug!(path, "Configuration loaded");
        Ok(loaded)
    }

    /// Check every section against its allowed ranges.
    pub fn validate(&self) -> Result<(), AppError> {
        self.propagation.validate()?;
        self.logging.validate()
    }
}
