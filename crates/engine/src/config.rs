//! Configuration for the Dialectic pipeline

use std::path::Path;

use dialectic_model::{BackendOptions, DEFAULT_BACKEND};
use serde::{Deserialize, Serialize};

use crate::orchestrator::DEFAULT_MAX_ATTEMPTS;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialecticConfig {
    /// Generation backend selection
    #[serde(default)]
    pub backend: BackendSettings,

    /// Validation loop settings
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend to use, and whether to use it at all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Backend name, e.g. `mock`, `deepseek`, `local`
    #[serde(default = "default_backend_name")]
    pub name: String,

    /// Route generation, validation and calibration through the backend
    #[serde(default)]
    pub use_backend: bool,

    /// Credentials, model and endpoint overrides
    #[serde(default)]
    pub options: BackendOptions,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            use_backend: false,
            options: BackendOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Regeneration budget of the validation loop
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_backend_name() -> String {
    DEFAULT_BACKEND.to_string()
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DialecticConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `DIALECTIC_`-prefixed environment variables (`__` separates nested
    /// keys, e.g. `DIALECTIC_BACKEND__NAME=deepseek`).
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DialecticConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DIALECTIC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DialecticConfig::default();
        assert_eq!(config.backend.name, "mock");
        assert!(!config.backend.use_backend);
        assert_eq!(config.pipeline.max_attempts, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file() {
        let config = DialecticConfig::load(None).unwrap();
        assert_eq!(config.pipeline.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "dialectic-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[backend]\nname = \"deepseek\"\nuse_backend = true\n\n\
             [backend.options]\napi_key = \"sk-test\"\ntimeout_secs = 15\n\n\
             [pipeline]\nmax_attempts = 5\n",
        )
        .unwrap();

        let config = DialecticConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.backend.name, "deepseek");
        assert!(config.backend.use_backend);
        assert_eq!(config.backend.options.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.backend.options.timeout_secs(), 15);
        assert_eq!(config.pipeline.max_attempts, 5);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config =
            DialecticConfig::load(Some(Path::new("/nonexistent/dialectic.toml"))).unwrap();
        assert_eq!(config.backend.name, "mock");
    }
}
