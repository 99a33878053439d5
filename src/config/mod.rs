//! Configuration management module.
//!
//! Supports loading configuration from:
//! - A `.env` file in the working directory
//! - TOML files (config/default.toml, config/{profile}.toml)
//! - An explicit file named by `IDGEN_CONFIG`
//! - Environment variables with `IDGEN_WORKER__<SECTION>__<KEY>` pattern

mod server;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::{Bounds, GeneratorConfig};

pub use server::ServerConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// ID generator configuration. `idgen.instance_id` has no default.
    pub idgen: GeneratorConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Create a configuration with defaults everywhere except the instance id.
    #[must_use]
    pub fn with_instance_id(instance_id: u64) -> Self {
        Self {
            server: ServerConfig::default(),
            idgen: GeneratorConfig::with_instance_id(instance_id),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. `config/default.toml`
    /// 2. `config/{IDGEN_PROFILE}.toml` (if `IDGEN_PROFILE` is set)
    /// 3. The file named by `IDGEN_CONFIG` (if set)
    /// 4. Environment variables with `IDGEN_WORKER__` prefix
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();

        let profile = std::env::var("IDGEN_PROFILE").unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false));

        if let Ok(path) = std::env::var("IDGEN_CONFIG") {
            builder = builder.add_source(File::with_name(&path));
        }

        // IDGEN_WORKER__IDGEN__INSTANCE_ID=3 -> idgen.instance_id = 3
        let config = builder
            .add_source(
                Environment::with_prefix("IDGEN_WORKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port cannot be 0".to_string()));
        }

        if self.server.max_count == 0 {
            return Err(ConfigError::Message(
                "server.max_count cannot be 0".to_string(),
            ));
        }

        if !self.observability.metrics_path.starts_with('/') {
            return Err(ConfigError::Message(
                "observability.metrics_path must start with '/'".to_string(),
            ));
        }

        Bounds::resolve(&self.idgen).map_err(|e| ConfigError::Message(format!("idgen: {e}")))?;

        Ok(())
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Enable Prometheus metrics endpoint.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Metrics endpoint path.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_metrics_enabled() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_enabled: true,
            metrics_path: default_metrics_path(),
        }
    }
}
